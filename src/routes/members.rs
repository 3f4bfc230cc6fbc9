use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::instrument;
use validator::Validate;

use crate::{
    app_state::AppState,
    error::{ApiError, Result},
    models::members::{
        CreateMemberRequest, ListMembersQuery, MemberDetailResponse, UpdateMemberRequest,
    },
};

/// POST /api/v1/members
///
/// Register a new member
///
/// Request body:
/// ```json
/// {
///   "firstName": "Ayse",
///   "lastName": "Demir",
///   "phone": "+90 555 000 0000",  // optional
///   "email": "ayse@example.com"   // optional
/// }
/// ```
#[instrument(skip(state, request))]
pub async fn create_member(
    State(state): State<AppState>,
    Json(request): Json<CreateMemberRequest>,
) -> Result<(StatusCode, Json<entity::members::Model>)> {
    request
        .validate()
        .map_err(|e| ApiError::BadRequest(format!("Validation error: {}", e)))?;

    let member = state.members.create_member(request).await?;

    Ok((StatusCode::CREATED, Json(member)))
}

/// GET /api/v1/members?active=true
#[instrument(skip(state))]
pub async fn list_members(
    State(state): State<AppState>,
    Query(query): Query<ListMembersQuery>,
) -> Result<Json<Vec<entity::members::Model>>> {
    let members = state.members.list_members(query.active).await?;

    Ok(Json(members))
}

/// GET /api/v1/members/{id}
///
/// Member profile with packages and recent lesson history
#[instrument(skip(state))]
pub async fn get_member(
    State(state): State<AppState>,
    Path(member_id): Path<i32>,
) -> Result<Json<MemberDetailResponse>> {
    let detail = state.members.get_member(member_id).await?;

    Ok(Json(detail))
}

/// PUT /api/v1/members/{id}
#[instrument(skip(state, request))]
pub async fn update_member(
    State(state): State<AppState>,
    Path(member_id): Path<i32>,
    Json(request): Json<UpdateMemberRequest>,
) -> Result<StatusCode> {
    request
        .validate()
        .map_err(|e| ApiError::BadRequest(format!("Validation error: {}", e)))?;

    state.members.update_member(member_id, request).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/members/{id}
///
/// Cascades the member's packages, lesson history and check-ins
#[instrument(skip(state))]
pub async fn delete_member(
    State(state): State<AppState>,
    Path(member_id): Path<i32>,
) -> Result<StatusCode> {
    state.members.delete_member(member_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
