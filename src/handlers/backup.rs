use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::header,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::Serialize;

use crate::db::Backup;
use crate::{GradebookError, router::GradebookState};

#[derive(Debug, Serialize)]
pub struct ImportSummary {
    pub students: usize,
    pub grades: usize,
}

/// GET /backup -> JSON dump served as a download.
pub async fn export_backup(
    State(state): State<GradebookState>,
) -> Result<Response, GradebookError> {
    let backup = state.storage.export_backup().await?;
    let disposition = format!(
        "attachment; filename=\"gradebook-backup-{}.json\"",
        Utc::now().format("%Y-%m-%d")
    );
    Ok(([(header::CONTENT_DISPOSITION, disposition)], Json(backup)).into_response())
}

/// POST /backup -> restore a previously exported dump into the store.
pub async fn import_backup(
    State(state): State<GradebookState>,
    backup: Result<Json<Backup>, JsonRejection>,
) -> Result<Json<ImportSummary>, GradebookError> {
    let Json(backup) = backup?;
    state.storage.import_backup(&backup).await?.into_result()?;
    Ok(Json(ImportSummary {
        students: backup.students.len(),
        grades: backup.grades.len(),
    }))
}
