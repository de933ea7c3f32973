use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::handlers;
use super::state::AppState;

// Multipart audio uploads can be several MB; raise the default extractor cap.
const UPLOAD_LIMIT_BYTES: usize = 64 * 1024 * 1024;

/// Create the gateway router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/session/create", post(handlers::create_session))
        .route("/upload", post(handlers::upload))
        .route("/stt/transcribe-chunk", post(handlers::transcribe_chunk))
        .route("/debug-upload", post(handlers::debug_upload))
        .layer(DefaultBodyLimit::max(UPLOAD_LIMIT_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
