// Route modules
pub mod attendance;
pub mod lessons;
pub mod maintenance;
pub mod members;
pub mod packages;

use crate::{app_state::AppState, middleware::logging_middleware};
use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::time::Duration;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer};

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", api_v1_routes())
        .layer(middleware::from_fn(logging_middleware))
        .layer(CorsLayer::permissive())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .with_state(state)
}

/// API v1 routes
fn api_v1_routes() -> Router<AppState> {
    Router::new()
        // Members
        .route(
            "/members",
            get(members::list_members).post(members::create_member),
        )
        .route(
            "/members/{id}",
            get(members::get_member)
                .put(members::update_member)
                .delete(members::delete_member),
        )
        // Packages
        .route(
            "/members/{id}/packages",
            get(packages::list_member_packages).post(packages::purchase_package),
        )
        .route("/members/{id}/packages/queue", post(packages::queue_package))
        .route(
            "/members/{id}/packages/activate",
            post(packages::activate_waiting),
        )
        .route("/packages/{id}", delete(packages::delete_package))
        // Lessons
        .route(
            "/lessons",
            get(lessons::list_lessons).post(lessons::create_lesson),
        )
        .route(
            "/lessons/{id}",
            axum::routing::put(lessons::update_lesson).delete(lessons::delete_lesson),
        )
        // Attendance
        .route("/attendance", post(attendance::record_attendance))
        .route(
            "/attendance/{id}",
            axum::routing::put(attendance::update_attendance).delete(attendance::delete_attendance),
        )
        .route(
            "/members/{id}/attendance",
            get(attendance::list_member_attendance),
        )
        .route(
            "/members/{id}/checkins",
            get(attendance::list_member_checkins),
        )
        // Maintenance
        .route(
            "/maintenance/cleanup-duplicate-packages",
            post(maintenance::cleanup_duplicate_packages),
        )
        .route(
            "/maintenance/backfill-package/{member_id}",
            post(maintenance::backfill_package),
        )
}
