//! Router configuration for the API server.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use super::handlers;
use super::AppState;

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::health))
        // Index
        .route("/api/search", get(handlers::search))
        .route("/api/index/status", get(handlers::index_status))
        .route("/api/index/start", post(handlers::index_start))
        // Live walk of the site hierarchy
        .route("/api/years", get(handlers::years))
        .route("/api/movies", get(handlers::movies))
        .route("/api/details", get(handlers::details))
        .route("/api/files", get(handlers::files))
        .route("/api/stream", get(handlers::stream))
        .route("/api/auto-stream", get(handlers::auto_stream))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
