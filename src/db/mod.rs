//! Database module: models and schema for the student/grade store.
//!
//! Layout:
//! - `models.rs`: typed records, write outcomes and rejection reasons
//! - `schema.rs`: SQL DDL for initializing the database
//! - `sqlite.rs`: the store handle and every query/aggregation

pub mod models;
pub mod schema;
pub mod sqlite;

pub use models::{
    Backup, Grade, GradeEntry, Rejection, Student, StudentReport, SubjectTopper, WriteOutcome,
};
pub use schema::SQLITE_INIT;
pub use sqlite::{GradebookStorage, SqlitePool};
