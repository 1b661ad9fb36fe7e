//! API module
//!
//! HTTP API endpoints and middleware.

pub mod middleware;
pub mod routes;

use axum::Router;
use tower_http::trace::TraceLayer;

pub use routes::create_router;

use crate::state::AppState;

/// Build the full application router.
pub fn build_router(state: AppState) -> Router {
    // Axum layers run in reverse order (last added = first executed):
    // context -> logging -> handler
    let api_routes = create_router()
        .layer(axum::middleware::from_fn(middleware::logging_middleware))
        .layer(axum::middleware::from_fn(middleware::context_middleware));

    Router::new()
        .route("/health", axum::routing::get(health_check))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
