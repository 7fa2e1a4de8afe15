use thiserror::Error;

use crate::engine::types::{DetectorKind, Handedness};

/// Failure reported by an upstream detector for one frame.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{detector} detector failed: {message}")]
pub struct DetectionFailure {
    pub detector: DetectorKind,
    pub message: String,
}

/// Reasons a frame produced no metric update. None of these are fatal.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FrameSkip {
    #[error(transparent)]
    DetectionFailure(#[from] DetectionFailure),
    #[error("insufficient landmarks: found={found}, required>{required}")]
    InsufficientLandmarks { found: usize, required: usize },
    #[error("no pose landmarks cached for {handedness:?} elbow")]
    MissingPose { handedness: Handedness },
    #[error("elbow visibility {visibility} below {threshold}")]
    StaleElbowConfidence { visibility: f64, threshold: f64 },
    #[error("wrist angle {angle} exceeds {limit}")]
    OutOfRangeMeasurement { angle: f64, limit: f64 },
    #[error("wrist and elbow share a y coordinate; apogee undefined")]
    UndefinedApogee,
}

impl FrameSkip {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DetectionFailure(_) => "detection_failure",
            Self::InsufficientLandmarks { .. } => "insufficient_landmarks",
            Self::MissingPose { .. } => "missing_pose",
            Self::StaleElbowConfidence { .. } => "stale_elbow_confidence",
            Self::OutOfRangeMeasurement { .. } => "out_of_range_measurement",
            Self::UndefinedApogee => "undefined_apogee",
        }
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("session is closed")]
    SessionClosed,
    #[error("{detector} frame queue is full; frame dropped")]
    QueueFull { detector: DetectorKind },
}
