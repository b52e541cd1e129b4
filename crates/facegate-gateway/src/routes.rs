//! Route table and middleware stack

use crate::handlers;
use crate::middleware::{authenticate, request_id, require_admission};
use crate::state::AppState;
use axum::extract::DefaultBodyLimit;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Build the gateway router.
///
/// Admission counting sits inside authentication, so the identity is
/// always resolved before its window is charged.
pub fn create_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/protected-health", get(handlers::protected_health))
        .route(
            "/search-face",
            post(handlers::search_face)
                .route_layer(from_fn_with_state(state.clone(), require_admission)),
        )
        .route("/download/{filename}", get(handlers::download_image))
        .route("/test-upstream", get(handlers::test_upstream))
        .route("/debug/upstream-dataset", get(handlers::upstream_dataset))
        .route("/admin/user-activity", get(handlers::user_activity))
        .route_layer(from_fn_with_state(state.clone(), authenticate));

    Router::new()
        .route("/health", get(handlers::health))
        .merge(protected)
        .layer(from_fn(request_id))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(DefaultBodyLimit::max(state.config.body_limit()))
        .with_state(state)
}
