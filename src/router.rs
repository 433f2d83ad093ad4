use axum::{
    Router,
    routing::get,
};

use crate::db::GradebookStorage;
use crate::handlers::{backup, reports, students};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct GradebookState {
    pub storage: GradebookStorage,
}

impl GradebookState {
    pub fn new(storage: GradebookStorage) -> Self {
        Self { storage }
    }
}

pub fn gradebook_router(state: GradebookState) -> Router {
    Router::new()
        .route(
            "/students",
            get(students::list_students).post(students::add_student),
        )
        .route("/students/{id}", get(students::student_detail))
        .route(
            "/students/{id}/grades",
            get(students::list_grades).post(students::add_grade),
        )
        .route("/reports", get(reports::subject_report))
        .route(
            "/backup",
            get(backup::export_backup).post(backup::import_backup),
        )
        .with_state(state)
}
