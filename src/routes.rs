use std::time::Duration;

use axum::{
    Router,
    http::StatusCode,
    routing::{delete, get, post},
};
use tower_http::timeout::TimeoutLayer;

use crate::{AppState, handlers};

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health_check))
        .route("/api/favorites", post(handlers::add_favorite))
        .route("/api/favorites/{user_id}", get(handlers::list_favorites))
        .route(
            "/api/favorites/{user_id}/{recipe_id}",
            delete(handlers::remove_favorite),
        )
        .route("/api/ai/chat", post(handlers::chat))
        .route("/api/ai/quiz", post(handlers::quiz))
        .with_state(state)
}

/// Bounds every request; an expired request is reported as a server error.
pub fn with_request_timeout(router: Router, timeout: Duration) -> Router {
    router.layer(TimeoutLayer::with_status_code(
        StatusCode::INTERNAL_SERVER_ERROR,
        timeout,
    ))
}
