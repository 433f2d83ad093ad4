use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};
use serde::{Deserialize, Serialize};

use crate::db::SubjectTopper;
use crate::{GradebookError, router::GradebookState};

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub subject: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubjectReport {
    pub subject: String,
    pub topper: Option<SubjectTopper>,
    pub class_average: f64,
}

/// GET /reports?subject=...
pub async fn subject_report(
    State(state): State<GradebookState>,
    query: Result<Query<ReportQuery>, QueryRejection>,
) -> Result<Json<SubjectReport>, GradebookError> {
    let Query(query) = query?;
    let subject = query.subject.as_deref().map(str::trim).unwrap_or_default();
    if subject.is_empty() {
        return Err(GradebookError::Validation("Subject is required.".to_string()));
    }

    let topper = state.storage.subject_topper(subject).await?;
    let class_average = state.storage.class_average_for_subject(subject).await?;

    Ok(Json(SubjectReport {
        subject: subject.to_string(),
        topper,
        class_average,
    }))
}
