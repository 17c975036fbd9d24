//! HTTP routes.

use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use gatehouse_auth::http::{ApiState, login_handler, register_handler};

/// Builds the application router.
pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/login", post(login_handler))
        .route("/register", post(register_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_handler() -> &'static str {
    "OK"
}
