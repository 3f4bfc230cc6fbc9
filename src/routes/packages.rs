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
    models::packages::{ActivationResponse, PurchasePackageRequest},
};

/// POST /api/v1/members/{id}/packages
///
/// Purchase a lesson package. Fails with 409 when the member already owns
/// one; additional packages go through the queue endpoint.
///
/// Request body:
/// ```json
/// {
///   "packageName": "Grup8",
///   "lessonCount": 8   // optional, parsed from the name when omitted
/// }
/// ```
#[instrument(skip(state, request))]
pub async fn purchase_package(
    State(state): State<AppState>,
    Path(member_id): Path<i32>,
    Json(request): Json<PurchasePackageRequest>,
) -> Result<(StatusCode, Json<entity::member_packages::Model>)> {
    request
        .validate()
        .map_err(|e| ApiError::BadRequest(format!("Validation error: {}", e)))?;

    let lesson_count = request.resolve_lesson_count().ok_or_else(|| {
        ApiError::BadRequest(format!(
            "Cannot determine lesson count for package {}",
            request.package_name
        ))
    })?;

    let package = state
        .ledger
        .purchase(member_id, &request.package_name, lesson_count)
        .await?;

    Ok((StatusCode::CREATED, Json(package)))
}

/// POST /api/v1/members/{id}/packages/queue
///
/// Queue an additional package behind the current one
#[instrument(skip(state, request))]
pub async fn queue_package(
    State(state): State<AppState>,
    Path(member_id): Path<i32>,
    Json(request): Json<PurchasePackageRequest>,
) -> Result<(StatusCode, Json<entity::member_packages::Model>)> {
    request
        .validate()
        .map_err(|e| ApiError::BadRequest(format!("Validation error: {}", e)))?;

    let lesson_count = request.resolve_lesson_count().ok_or_else(|| {
        ApiError::BadRequest(format!(
            "Cannot determine lesson count for package {}",
            request.package_name
        ))
    })?;

    let package = state
        .ledger
        .queue_package(member_id, &request.package_name, lesson_count)
        .await?;

    Ok((StatusCode::CREATED, Json(package)))
}

/// GET /api/v1/members/{id}/packages
#[instrument(skip(state))]
pub async fn list_member_packages(
    State(state): State<AppState>,
    Path(member_id): Path<i32>,
) -> Result<Json<Vec<entity::member_packages::Model>>> {
    let packages = state.ledger.list_packages(member_id).await?;

    Ok(Json(packages))
}

/// POST /api/v1/members/{id}/packages/activate
///
/// Idempotent administrative activation of the oldest waiting package;
/// a no-op when the member is not exhausted or nothing is waiting
#[instrument(skip(state))]
pub async fn activate_waiting(
    State(state): State<AppState>,
    Path(member_id): Path<i32>,
) -> Result<Json<ActivationResponse>> {
    let activated = state.activator.activate_waiting(member_id).await?;

    Ok(Json(ActivationResponse {
        activated: activated.is_some(),
        package: activated,
    }))
}

/// DELETE /api/v1/packages/{id}
///
/// Hard-deletes the package and zeroes the owner's counters; an active
/// package hands over to the next waiting one
#[instrument(skip(state))]
pub async fn delete_package(
    State(state): State<AppState>,
    Path(package_id): Path<i32>,
) -> Result<StatusCode> {
    state.ledger.delete_package(package_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
