//! SQL DDL for initializing the gradebook storage.
//! Every statement is idempotent so it can run on each startup.

/// SQLite schema with:
/// - `students.id` / `grades.id` INTEGER PRIMARY KEY AUTOINCREMENT
/// - `roll_number` UNIQUE (the authoritative duplicate check)
/// - `grades.student_id` referencing `students(id)` with ON DELETE CASCADE
/// - `score` constrained to 0..=100
/// - secondary indexes backing per-student listings and subject reports
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS students (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    roll_number TEXT UNIQUE NOT NULL
);

CREATE TABLE IF NOT EXISTS grades (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    student_id INTEGER NOT NULL,
    subject TEXT NOT NULL,
    score INTEGER NOT NULL CHECK(score BETWEEN 0 AND 100),
    FOREIGN KEY(student_id) REFERENCES students(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_grades_student ON grades(student_id);
CREATE INDEX IF NOT EXISTS idx_grades_subject ON grades(subject);
"#;
