use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use serde::Serialize;

use crate::engine::SessionConfig;
use crate::extractors::JsonBody;
use crate::response::{created, ok, AppError};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_session).post(start_session).delete(stop_session))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionStarted {
    session_id: String,
    config: SessionConfig,
    replaced_session_id: Option<String>,
}

async fn start_session(
    State(state): State<AppState>,
    JsonBody(config): JsonBody<SessionConfig>,
) -> Result<impl IntoResponse, AppError> {
    let (session_id, previous) = state.start_session(config).await;
    if let Some(report) = &previous {
        tracing::info!(
            session_id = %report.session_id,
            metrics = ?report.metrics.current_values(),
            "Session replaced"
        );
    }
    Ok(created(SessionStarted {
        session_id,
        config,
        replaced_session_id: previous.map(|r| r.session_id),
    }))
}

async fn get_session(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let guard = state.session().read().await;
    let handle = guard
        .as_ref()
        .ok_or_else(|| AppError::not_found("No active session"))?;
    let report = handle.report().await?;
    Ok(ok(report))
}

async fn stop_session(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let report = state
        .stop_session()
        .await?
        .ok_or_else(|| AppError::not_found("No active session"))?;
    Ok(ok(report))
}
