use axum::{
    extract::{Path, State},
    Json,
};
use tracing::instrument;

use crate::{
    app_state::AppState,
    error::Result,
    models::maintenance::{BackfillResponse, CleanupResponse},
};

/// POST /api/v1/maintenance/cleanup-duplicate-packages
///
/// Idempotent repair: per member and package name only the most recent
/// row survives
#[instrument(skip(state))]
pub async fn cleanup_duplicate_packages(
    State(state): State<AppState>,
) -> Result<Json<CleanupResponse>> {
    let removed = state.reconciliation.cleanup_duplicate_packages().await?;

    Ok(Json(CleanupResponse { removed }))
}

/// POST /api/v1/maintenance/backfill-package/{member_id}
///
/// Synthesize a retroactive package for pre-package data
#[instrument(skip(state))]
pub async fn backfill_package(
    State(state): State<AppState>,
    Path(member_id): Path<i32>,
) -> Result<Json<BackfillResponse>> {
    let package = state.reconciliation.backfill_package(member_id).await?;

    Ok(Json(BackfillResponse {
        created: package.is_some(),
        package,
    }))
}
