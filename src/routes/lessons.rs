use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::instrument;
use validator::Validate;

use crate::{
    app_state::AppState,
    error::{ApiError, Result},
    models::lessons::{CreateLessonRequest, UpdateLessonRequest},
};

/// POST /api/v1/lessons
#[instrument(skip(state, request))]
pub async fn create_lesson(
    State(state): State<AppState>,
    Json(request): Json<CreateLessonRequest>,
) -> Result<(StatusCode, Json<entity::lessons::Model>)> {
    request
        .validate()
        .map_err(|e| ApiError::BadRequest(format!("Validation error: {}", e)))?;

    let lesson = state.lessons.create_lesson(request).await?;

    Ok((StatusCode::CREATED, Json(lesson)))
}

/// GET /api/v1/lessons
#[instrument(skip(state))]
pub async fn list_lessons(
    State(state): State<AppState>,
) -> Result<Json<Vec<entity::lessons::Model>>> {
    let lessons = state.lessons.list_lessons().await?;

    Ok(Json(lessons))
}

/// PUT /api/v1/lessons/{id}
#[instrument(skip(state, request))]
pub async fn update_lesson(
    State(state): State<AppState>,
    Path(lesson_id): Path<i32>,
    Json(request): Json<UpdateLessonRequest>,
) -> Result<StatusCode> {
    request
        .validate()
        .map_err(|e| ApiError::BadRequest(format!("Validation error: {}", e)))?;

    state.lessons.update_lesson(lesson_id, request).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/lessons/{id}
#[instrument(skip(state))]
pub async fn delete_lesson(
    State(state): State<AppState>,
    Path(lesson_id): Path<i32>,
) -> Result<StatusCode> {
    state.lessons.delete_lesson(lesson_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
