use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::db::models::score_in_range;
use crate::db::{GradeEntry, Student, StudentReport};
use crate::{GradebookError, router::GradebookState};

#[derive(Debug, Deserialize)]
pub struct NewStudent {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub roll_number: String,
}

/// Score may arrive as a JSON number or as the raw text of a form field.
#[derive(Debug, Deserialize)]
pub struct NewGrade {
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub score: Value,
}

#[derive(Debug, Serialize)]
pub struct CreatedGrade {
    pub id: i64,
    pub student_id: i64,
    pub subject: String,
    pub score: i64,
}

/// GET /students
pub async fn list_students(
    State(state): State<GradebookState>,
) -> Result<Json<Vec<Student>>, GradebookError> {
    Ok(Json(state.storage.list_students().await?))
}

/// POST /students
pub async fn add_student(
    State(state): State<GradebookState>,
    body: Result<Json<NewStudent>, JsonRejection>,
) -> Result<(StatusCode, Json<Student>), GradebookError> {
    let Json(body) = body?;
    let name = body.name.trim();
    let roll_number = body.roll_number.trim();
    if name.is_empty() || roll_number.is_empty() {
        return Err(GradebookError::Validation(
            "Name and Roll number are required.".to_string(),
        ));
    }

    let id = state
        .storage
        .add_student(name, roll_number)
        .await?
        .into_result()?;

    info!(id, "student created via API");
    Ok((
        StatusCode::CREATED,
        Json(Student {
            id,
            name: name.to_string(),
            roll_number: roll_number.to_string(),
        }),
    ))
}

/// GET /students/{id}
pub async fn student_detail(
    State(state): State<GradebookState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<StudentReport>, GradebookError> {
    let Path(id) = id?;
    state
        .storage
        .student_report(id)
        .await?
        .map(Json)
        .ok_or(GradebookError::StudentNotFound)
}

/// GET /students/{id}/grades
pub async fn list_grades(
    State(state): State<GradebookState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Vec<GradeEntry>>, GradebookError> {
    let Path(id) = id?;
    if state.storage.find_student_by_id(id).await?.is_none() {
        return Err(GradebookError::StudentNotFound);
    }
    Ok(Json(state.storage.list_grades_for_student(id).await?))
}

/// POST /students/{id}/grades
pub async fn add_grade(
    State(state): State<GradebookState>,
    student_id: Result<Path<i64>, PathRejection>,
    body: Result<Json<NewGrade>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedGrade>), GradebookError> {
    let Path(student_id) = student_id?;
    let Json(body) = body?;
    if state.storage.find_student_by_id(student_id).await?.is_none() {
        return Err(GradebookError::StudentNotFound);
    }

    let subject = body.subject.trim();
    if subject.is_empty() {
        return Err(GradebookError::Validation("Subject is required.".to_string()));
    }
    let Some(score) = parse_score(&body.score) else {
        return Err(GradebookError::Validation(
            "Score must be an integer between 0 and 100.".to_string(),
        ));
    };

    let id = state
        .storage
        .add_grade(student_id, subject, score)
        .await?
        .into_result()?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedGrade {
            id,
            student_id,
            subject: subject.to_string(),
            score,
        }),
    ))
}

fn parse_score(raw: &Value) -> Option<i64> {
    let score = match raw {
        Value::Number(n) => n.as_i64()?,
        Value::String(s) => s.trim().parse::<i64>().ok()?,
        _ => return None,
    };
    score_in_range(score).then_some(score)
}
