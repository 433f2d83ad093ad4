use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error as ThisError;

/// Lowest score a grade may carry.
pub const MIN_SCORE: i64 = 0;
/// Highest score a grade may carry.
pub const MAX_SCORE: i64 = 100;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, FromRow)]
pub struct Student {
    pub id: i64,
    pub name: String,
    pub roll_number: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, FromRow)]
pub struct Grade {
    pub id: i64,
    pub student_id: i64,
    pub subject: String,
    pub score: i64,
}

/// A grade as listed on a student's page: no ids.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, FromRow)]
pub struct GradeEntry {
    pub subject: String,
    pub score: i64,
}

impl From<Grade> for GradeEntry {
    fn from(g: Grade) -> Self {
        Self {
            subject: g.subject,
            score: g.score,
        }
    }
}

/// Highest scorer of a subject. Carries the name only, never the id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, FromRow)]
pub struct SubjectTopper {
    pub name: String,
    pub score: i64,
}

/// Student detail: the record plus its grades (most recent first) and average.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StudentReport {
    pub student: Student,
    pub average: f64,
    pub grades: Vec<GradeEntry>,
}

/// Full dump of both tables, ids and foreign keys included.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Backup {
    pub students: Vec<Student>,
    pub grades: Vec<Grade>,
}

impl Backup {
    /// `InvalidRow` when any row has a blank name, roll number or subject.
    pub fn blank_row(&self) -> Option<Rejection> {
        let blank_student = self
            .students
            .iter()
            .any(|s| s.name.trim().is_empty() || s.roll_number.trim().is_empty());
        let blank_grade = self.grades.iter().any(|g| g.subject.trim().is_empty());
        (blank_student || blank_grade).then_some(Rejection::InvalidRow)
    }
}

/// Expected business-rule failure of a write. `Display` is the user-facing reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ThisError)]
pub enum Rejection {
    #[error("Roll number already exists. Use a unique roll number.")]
    DuplicateRollNumber,

    #[error("Score must be between 0 and 100.")]
    ScoreOutOfRange,

    #[error("Student does not exist.")]
    StudentNotFound,

    #[error("Backup conflicts with existing rows.")]
    BackupConflict,

    #[error("Backup contains a blank name, roll number or subject.")]
    InvalidRow,
}

impl Rejection {
    /// Stable machine-readable code used in API error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Rejection::DuplicateRollNumber => "DUPLICATE_ROLL_NUMBER",
            Rejection::ScoreOutOfRange => "SCORE_OUT_OF_RANGE",
            Rejection::StudentNotFound => "STUDENT_NOT_FOUND",
            Rejection::BackupConflict => "BACKUP_CONFLICT",
            Rejection::InvalidRow => "INVALID_ROW",
        }
    }
}

/// Result of a write: either the row was committed or a business rule refused it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome<T> {
    Created(T),
    Rejected(Rejection),
}

impl<T> WriteOutcome<T> {
    pub fn is_created(&self) -> bool {
        matches!(self, WriteOutcome::Created(_))
    }

    pub fn rejection(&self) -> Option<Rejection> {
        match self {
            WriteOutcome::Created(_) => None,
            WriteOutcome::Rejected(r) => Some(*r),
        }
    }

    pub fn into_result(self) -> Result<T, Rejection> {
        match self {
            WriteOutcome::Created(v) => Ok(v),
            WriteOutcome::Rejected(r) => Err(r),
        }
    }
}

/// Whether `score` is an acceptable grade.
pub fn score_in_range(score: i64) -> bool {
    (MIN_SCORE..=MAX_SCORE).contains(&score)
}

/// Round to two decimals, half away from zero. `None` (empty set) becomes 0.
pub fn round_average(avg: Option<f64>) -> f64 {
    match avg {
        Some(v) if v.is_finite() => (v * 100.0).round() / 100.0,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_average_is_zero() {
        assert_eq!(round_average(None), 0.0);
    }

    #[test]
    fn average_rounds_to_two_decimals() {
        assert_eq!(round_average(Some(80.0)), 80.0);
        assert_eq!(round_average(Some(200.0 / 3.0)), 66.67);
        assert_eq!(round_average(Some(100.0 / 3.0)), 33.33);
    }

    #[test]
    fn average_ties_round_away_from_zero() {
        // 640 / 8, exactly representable
        assert_eq!(round_average(Some(80.125)), 80.13);
        assert_eq!(round_average(Some(80.375)), 80.38);
    }

    #[test]
    fn score_bounds_are_inclusive() {
        assert!(score_in_range(0));
        assert!(score_in_range(100));
        assert!(!score_in_range(-1));
        assert!(!score_in_range(101));
    }

    #[test]
    fn rejection_messages_are_human_readable() {
        assert_eq!(
            Rejection::DuplicateRollNumber.to_string(),
            "Roll number already exists. Use a unique roll number."
        );
        assert_eq!(Rejection::StudentNotFound.to_string(), "Student does not exist.");
        assert_eq!(
            WriteOutcome::<i64>::Rejected(Rejection::ScoreOutOfRange).rejection(),
            Some(Rejection::ScoreOutOfRange)
        );
    }
}
