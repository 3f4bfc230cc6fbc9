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
    models::attendance::{RecordAttendanceRequest, UpdateAttendanceRequest},
};

/// POST /api/v1/attendance
///
/// Record a lesson attendance event
///
/// Request body:
/// ```json
/// {
///   "memberId": 12,
///   "lessonId": 3,
///   "lessonDate": "2025-03-14",
///   "attended": true,
///   "kind": "included",
///   "notes": "late arrival"   // optional
/// }
/// ```
///
/// An attended included lesson consumes one credit from the oldest
/// package with balance; the funding package is snapshotted on the row.
/// Duplicate (member, lesson, date) tuples are rejected with 409.
#[instrument(skip(state, request))]
pub async fn record_attendance(
    State(state): State<AppState>,
    Json(request): Json<RecordAttendanceRequest>,
) -> Result<(StatusCode, Json<entity::lesson_attendance::Model>)> {
    request
        .validate()
        .map_err(|e| ApiError::BadRequest(format!("Validation error: {}", e)))?;

    let row = state.recorder.record_attendance(request).await?;

    Ok((StatusCode::CREATED, Json(row)))
}

/// PUT /api/v1/attendance/{id}
///
/// Edit an event; the stored effect is reverted before the new one is
/// applied, so counters always reflect the final state
#[instrument(skip(state, request))]
pub async fn update_attendance(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<UpdateAttendanceRequest>,
) -> Result<StatusCode> {
    request
        .validate()
        .map_err(|e| ApiError::BadRequest(format!("Validation error: {}", e)))?;

    state.recorder.update_attendance(id, request).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/attendance/{id}
#[instrument(skip(state))]
pub async fn delete_attendance(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode> {
    state.recorder.delete_attendance(id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/members/{id}/attendance
#[instrument(skip(state))]
pub async fn list_member_attendance(
    State(state): State<AppState>,
    Path(member_id): Path<i32>,
) -> Result<Json<Vec<entity::lesson_attendance::Model>>> {
    let rows = state.recorder.list_for_member(member_id).await?;

    Ok(Json(rows))
}

/// GET /api/v1/members/{id}/checkins
#[instrument(skip(state))]
pub async fn list_member_checkins(
    State(state): State<AppState>,
    Path(member_id): Path<i32>,
) -> Result<Json<Vec<entity::attendance::Model>>> {
    let rows = state.recorder.checkins_for_member(member_id).await?;

    Ok(Json(rows))
}
