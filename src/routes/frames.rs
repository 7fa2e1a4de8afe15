use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::Router;
use serde::Serialize;

use crate::engine::types::{DetectorKind, DetectorPayload};
use crate::engine::{HandDetectionResult, PoseDetectionResult};
use crate::extractors::JsonBody;
use crate::response::{accepted, AppError};
use crate::state::AppState;
use crate::validation::{validate_hand_frame, validate_pose_frame};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/hand", post(push_hand))
        .route("/pose", post(push_pose))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FrameAccepted {
    session_id: String,
    detector: DetectorKind,
}

fn no_session() -> AppError {
    AppError::conflict("NO_ACTIVE_SESSION", "Start a session before pushing frames")
}

fn invalid_frame(message: &str) -> AppError {
    AppError::bad_request("INVALID_LANDMARK", message)
}

async fn push_hand(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<DetectorPayload<HandDetectionResult>>,
) -> Result<impl IntoResponse, AppError> {
    let output = payload.into_output(DetectorKind::Hand);
    if let Ok(frame) = &output {
        validate_hand_frame(frame).map_err(invalid_frame)?;
    }

    let guard = state.session().read().await;
    let handle = guard.as_ref().ok_or_else(no_session)?;
    handle.push_hand(output)?;

    Ok(accepted(FrameAccepted {
        session_id: handle.id().to_string(),
        detector: DetectorKind::Hand,
    }))
}

async fn push_pose(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<DetectorPayload<PoseDetectionResult>>,
) -> Result<impl IntoResponse, AppError> {
    let output = payload.into_output(DetectorKind::Pose);
    if let Ok(frame) = &output {
        validate_pose_frame(frame).map_err(invalid_frame)?;
    }

    let guard = state.session().read().await;
    let handle = guard.as_ref().ok_or_else(no_session)?;
    handle.push_pose(output)?;

    Ok(accepted(FrameAccepted {
        session_id: handle.id().to_string(),
        detector: DetectorKind::Pose,
    }))
}
