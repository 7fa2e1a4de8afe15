pub mod frames;
pub mod health;
pub mod realtime;
pub mod session;

use axum::extract::DefaultBodyLimit;
use axum::Router;

use crate::response::AppError;
use crate::state::AppState;

/// A pose frame is ~33 landmarks; 256 KiB leaves room for several detections.
const MAX_BODY_SIZE: usize = 256 * 1024;

pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .nest("/session", session::router())
        .nest("/frames", frames::router())
        .nest("/metrics", realtime::router())
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE));

    Router::new()
        .nest("/api", api_routes)
        .nest("/health", health::router())
        .fallback(fallback_404)
        .with_state(state)
}

async fn fallback_404() -> AppError {
    AppError::not_found("Not found")
}
