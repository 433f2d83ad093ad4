use crate::db::models::{
    Backup, Grade, GradeEntry, Rejection, Student, StudentReport, SubjectTopper, WriteOutcome,
    round_average, score_in_range,
};
use crate::db::schema::SQLITE_INIT;
use crate::error::GradebookError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Executor, Pool, Sqlite};
use std::str::FromStr;
use tracing::{debug, info, warn};

pub type SqlitePool = Pool<Sqlite>;

/// Handle to the student/grade store. Cheap to clone; every call checks a
/// connection out of the pool and returns it before the call completes.
#[derive(Clone)]
pub struct GradebookStorage {
    pool: SqlitePool,
}

impl GradebookStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if missing) the database at `database_url` and make sure
    /// the schema exists.
    pub async fn connect(database_url: &str) -> Result<Self, GradebookError> {
        let connect_opts = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new().connect_with(connect_opts).await?;
        let storage = Self::new(pool);
        storage.init_schema().await?;
        Ok(storage)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Initialize the schema by executing the bundled DDL.
    pub async fn init_schema(&self) -> Result<(), GradebookError> {
        // sqlx::query runs a single statement, so split the script
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// All students, most recently created first.
    pub async fn list_students(&self) -> Result<Vec<Student>, GradebookError> {
        let rows = sqlx::query_as::<_, Student>(
            "SELECT id, name, roll_number FROM students ORDER BY id DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        debug!(count = rows.len(), "listed students");
        Ok(rows)
    }

    /// Insert a student. The UNIQUE constraint on `roll_number` decides
    /// duplicates, so concurrent inserts of the same roll cannot both succeed.
    pub async fn add_student(
        &self,
        name: &str,
        roll_number: &str,
    ) -> Result<WriteOutcome<i64>, GradebookError> {
        let res = sqlx::query("INSERT INTO students (name, roll_number) VALUES (?, ?)")
            .bind(name)
            .bind(roll_number)
            .execute(&self.pool)
            .await;

        match res {
            Ok(done) => {
                let id = done.last_insert_rowid();
                info!(id, roll_number, "student added");
                Ok(WriteOutcome::Created(id))
            }
            Err(e) => match constraint_violation(&e) {
                Some(Violation::Unique) => {
                    warn!(roll_number, "duplicate roll number rejected");
                    Ok(WriteOutcome::Rejected(Rejection::DuplicateRollNumber))
                }
                _ => Err(e.into()),
            },
        }
    }

    pub async fn find_student_by_id(&self, id: i64) -> Result<Option<Student>, GradebookError> {
        let row = sqlx::query_as::<_, Student>(
            "SELECT id, name, roll_number FROM students WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Append a grade. The score and the owning student are checked here even
    /// when the caller already validated them.
    pub async fn add_grade(
        &self,
        student_id: i64,
        subject: &str,
        score: i64,
    ) -> Result<WriteOutcome<i64>, GradebookError> {
        if !score_in_range(score) {
            warn!(student_id, score, "score out of range rejected");
            return Ok(WriteOutcome::Rejected(Rejection::ScoreOutOfRange));
        }

        // Check and insert run as separate autocommit statements; the FK
        // constraint catches a student removed in between.
        if !student_exists(&self.pool, student_id).await? {
            warn!(student_id, "grade for unknown student rejected");
            return Ok(WriteOutcome::Rejected(Rejection::StudentNotFound));
        }

        let res = sqlx::query("INSERT INTO grades (student_id, subject, score) VALUES (?, ?, ?)")
            .bind(student_id)
            .bind(subject)
            .bind(score)
            .execute(&self.pool)
            .await;

        let id = match res {
            Ok(done) => done.last_insert_rowid(),
            Err(e) => {
                let rejection = match constraint_violation(&e) {
                    Some(Violation::ForeignKey) => Rejection::StudentNotFound,
                    Some(Violation::Check) => Rejection::ScoreOutOfRange,
                    _ => return Err(e.into()),
                };
                warn!(student_id, reason = %rejection, "grade rejected by constraint");
                return Ok(WriteOutcome::Rejected(rejection));
            }
        };

        info!(id, student_id, subject, score, "grade added");
        Ok(WriteOutcome::Created(id))
    }

    /// Grades of one student, most recently added first. Unknown students
    /// yield an empty list.
    pub async fn list_grades_for_student(
        &self,
        student_id: i64,
    ) -> Result<Vec<GradeEntry>, GradebookError> {
        let rows = sqlx::query_as::<_, GradeEntry>(
            "SELECT subject, score FROM grades WHERE student_id = ? ORDER BY id DESC",
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Mean score of one student rounded to 2dp; 0 when there are no grades.
    pub async fn average_for_student(&self, student_id: i64) -> Result<f64, GradebookError> {
        let avg: Option<f64> =
            sqlx::query_scalar("SELECT AVG(score) FROM grades WHERE student_id = ?")
                .bind(student_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(round_average(avg))
    }

    /// Highest score for `subject`; ties go to the alphabetically first name.
    pub async fn subject_topper(
        &self,
        subject: &str,
    ) -> Result<Option<SubjectTopper>, GradebookError> {
        let row = sqlx::query_as::<_, SubjectTopper>(
            r#"
            SELECT s.name AS name, g.score AS score
            FROM grades g
            JOIN students s ON g.student_id = s.id
            WHERE g.subject = ?
            ORDER BY g.score DESC, s.name ASC
            LIMIT 1
            "#,
        )
        .bind(subject)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Mean of every score recorded for `subject`, rounded to 2dp; 0 when none.
    pub async fn class_average_for_subject(&self, subject: &str) -> Result<f64, GradebookError> {
        let avg: Option<f64> = sqlx::query_scalar("SELECT AVG(score) FROM grades WHERE subject = ?")
            .bind(subject)
            .fetch_one(&self.pool)
            .await?;
        Ok(round_average(avg))
    }

    /// Student record with grades and average, or `None` for an unknown id.
    pub async fn student_report(
        &self,
        student_id: i64,
    ) -> Result<Option<StudentReport>, GradebookError> {
        let Some(student) = self.find_student_by_id(student_id).await? else {
            return Ok(None);
        };
        let grades = self.list_grades_for_student(student_id).await?;
        let average = self.average_for_student(student_id).await?;
        Ok(Some(StudentReport {
            student,
            average,
            grades,
        }))
    }

    /// Dump both tables. The two reads are not wrapped in one transaction.
    pub async fn export_backup(&self) -> Result<Backup, GradebookError> {
        let students =
            sqlx::query_as::<_, Student>("SELECT id, name, roll_number FROM students ORDER BY id")
                .fetch_all(&self.pool)
                .await?;
        let grades = sqlx::query_as::<_, Grade>(
            "SELECT id, student_id, subject, score FROM grades ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        info!(
            students = students.len(),
            grades = grades.len(),
            "backup exported"
        );
        Ok(Backup { students, grades })
    }

    /// Reinsert a backup, ids included, in a single transaction. Nothing is
    /// written unless every row is accepted; existing rows are never overwritten.
    pub async fn import_backup(&self, backup: &Backup) -> Result<WriteOutcome<()>, GradebookError> {
        if let Some(rejection) = backup.blank_row() {
            warn!("backup with blank fields rejected");
            return Ok(WriteOutcome::Rejected(rejection));
        }
        if let Some(g) = backup.grades.iter().find(|g| !score_in_range(g.score)) {
            warn!(id = g.id, score = g.score, "backup grade out of range");
            return Ok(WriteOutcome::Rejected(Rejection::ScoreOutOfRange));
        }

        // Every statement below is a write, so the transaction takes the write
        // lock on its first statement instead of upgrading from a read.
        let mut tx = self.pool.begin().await?;

        for s in &backup.students {
            let res = sqlx::query("INSERT INTO students (id, name, roll_number) VALUES (?, ?, ?)")
                .bind(s.id)
                .bind(&s.name)
                .bind(&s.roll_number)
                .execute(&mut *tx)
                .await;
            if let Err(e) = res {
                return match constraint_violation(&e) {
                    Some(Violation::Unique) => {
                        warn!(id = s.id, roll_number = %s.roll_number, "backup student conflicts");
                        Ok(WriteOutcome::Rejected(Rejection::BackupConflict))
                    }
                    _ => Err(e.into()),
                };
            }
        }

        for g in &backup.grades {
            let res = sqlx::query(
                "INSERT INTO grades (id, student_id, subject, score) VALUES (?, ?, ?, ?)",
            )
            .bind(g.id)
            .bind(g.student_id)
            .bind(&g.subject)
            .bind(g.score)
            .execute(&mut *tx)
            .await;
            if let Err(e) = res {
                let rejection = match constraint_violation(&e) {
                    Some(Violation::Unique) => Rejection::BackupConflict,
                    Some(Violation::ForeignKey) => Rejection::StudentNotFound,
                    Some(Violation::Check) => Rejection::ScoreOutOfRange,
                    None => return Err(e.into()),
                };
                warn!(id = g.id, student_id = g.student_id, reason = %rejection, "backup grade rejected");
                return Ok(WriteOutcome::Rejected(rejection));
            }
        }

        tx.commit().await?;
        info!(
            students = backup.students.len(),
            grades = backup.grades.len(),
            "backup imported"
        );
        Ok(WriteOutcome::Created(()))
    }
}

async fn student_exists<'e, E>(executor: E, id: i64) -> Result<bool, GradebookError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let hit: Option<i64> = sqlx::query_scalar("SELECT 1 FROM students WHERE id = ?")
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(hit.is_some())
}

/// Engine constraint that refused a write. Unique covers primary keys too.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Violation {
    Unique,
    ForeignKey,
    Check,
}

fn constraint_violation(err: &sqlx::Error) -> Option<Violation> {
    let sqlx::Error::Database(db) = err else {
        return None;
    };
    if db.is_unique_violation() {
        Some(Violation::Unique)
    } else if db.is_foreign_key_violation() {
        Some(Violation::ForeignKey)
    } else if db.is_check_violation() {
        Some(Violation::Check)
    } else {
        None
    }
}
