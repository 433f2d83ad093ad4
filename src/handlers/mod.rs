pub mod backup;
pub mod reports;
pub mod students;
