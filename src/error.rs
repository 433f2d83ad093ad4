use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;

use crate::db::Rejection;

#[derive(Debug, ThisError)]
pub enum GradebookError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] SqlxError),

    #[error("Configuration error: {0}")]
    ConfigError(#[from] figment::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("{0}")]
    Rejected(Rejection),

    #[error("Student not found")]
    StudentNotFound,
}

impl From<Rejection> for GradebookError {
    fn from(r: Rejection) -> Self {
        GradebookError::Rejected(r)
    }
}

impl From<JsonRejection> for GradebookError {
    fn from(r: JsonRejection) -> Self {
        GradebookError::Validation(r.body_text())
    }
}

impl From<PathRejection> for GradebookError {
    fn from(r: PathRejection) -> Self {
        GradebookError::Validation(r.body_text())
    }
}

impl From<QueryRejection> for GradebookError {
    fn from(r: QueryRejection) -> Self {
        GradebookError::Validation(r.body_text())
    }
}

impl IntoResponse for GradebookError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_body) = match self {
            GradebookError::DatabaseError(_)
            | GradebookError::ConfigError(_)
            | GradebookError::IoError(_) => {
                let status = StatusCode::INTERNAL_SERVER_ERROR;
                let body = ApiErrorBody {
                    code: "INTERNAL_ERROR".to_string(),
                    message: "An internal server error occurred.".to_string(),
                };
                (status, body)
            }
            GradebookError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ApiErrorBody {
                    code: "VALIDATION_ERROR".to_string(),
                    message: msg,
                },
            ),
            GradebookError::StudentNotFound => (
                StatusCode::NOT_FOUND,
                ApiErrorBody {
                    code: Rejection::StudentNotFound.code().to_string(),
                    message: "Student not found.".to_string(),
                },
            ),
            GradebookError::Rejected(reason) => {
                let status = match reason {
                    Rejection::DuplicateRollNumber | Rejection::BackupConflict => {
                        StatusCode::CONFLICT
                    }
                    Rejection::ScoreOutOfRange | Rejection::InvalidRow => StatusCode::BAD_REQUEST,
                    Rejection::StudentNotFound => StatusCode::NOT_FOUND,
                };
                (
                    status,
                    ApiErrorBody {
                        code: reason.code().to_string(),
                        message: reason.to_string(),
                    },
                )
            }
        };
        (status, Json(ApiErrorResponse { error: error_body })).into_response()
    }
}

/// Standardized API error response body
#[derive(Serialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}
