use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::engine::error::DetectionFailure;

/// Number of landmarks a complete hand detection carries.
pub const HAND_LANDMARK_COUNT: usize = 21;

pub mod hand {
    pub const WRIST: usize = 0;
    pub const THUMB_CMC: usize = 1;
    pub const THUMB_MCP: usize = 2;
    pub const THUMB_IP: usize = 3;
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_MCP: usize = 5;
    pub const INDEX_PIP: usize = 6;
    pub const INDEX_DIP: usize = 7;
    pub const INDEX_TIP: usize = 8;
    pub const MIDDLE_MCP: usize = 9;
    pub const MIDDLE_PIP: usize = 10;
    pub const MIDDLE_DIP: usize = 11;
    pub const MIDDLE_TIP: usize = 12;
    pub const RING_MCP: usize = 13;
    pub const RING_PIP: usize = 14;
    pub const RING_DIP: usize = 15;
    pub const RING_TIP: usize = 16;
    pub const PINKY_MCP: usize = 17;
    pub const PINKY_PIP: usize = 18;
    pub const PINKY_DIP: usize = 19;
    pub const PINKY_TIP: usize = 20;
}

pub mod pose {
    pub const LEFT_ELBOW: usize = 13;
    pub const RIGHT_ELBOW: usize = 14;
}

/// A normalized 3D point with optional detector confidence.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presence: Option<f64>,
}

impl Landmark {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z,
            visibility: None,
            presence: None,
        }
    }

    pub fn with_visibility(mut self, visibility: f64) -> Self {
        self.visibility = Some(visibility);
        self
    }

    /// Same point projected onto the z = 0 plane.
    pub fn with_zero_z(self) -> Self {
        Self { z: 0.0, ..self }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "Left",
            Self::Right => "Right",
        }
    }

    /// Pose landmark index of the elbow on the same side as this hand.
    pub fn elbow_index(self) -> usize {
        match self {
            Self::Left => pose::LEFT_ELBOW,
            Self::Right => pose::RIGHT_ELBOW,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedHand {
    pub handedness: Handedness,
    pub landmarks: Vec<Landmark>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandDetectionResult {
    #[serde(default)]
    pub hands: Vec<DetectedHand>,
    pub timestamp_ms: i64,
}

impl HandDetectionResult {
    pub fn primary(&self) -> Option<&DetectedHand> {
        self.hands.first()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoseDetectionResult {
    #[serde(default)]
    pub poses: Vec<Vec<Landmark>>,
    pub timestamp_ms: i64,
}

impl PoseDetectionResult {
    pub fn primary(&self) -> Option<&[Landmark]> {
        self.poses.first().map(Vec::as_slice)
    }
}

/// What a detector hands to the engine for one frame.
pub type DetectorOutput<T> = Result<T, DetectionFailure>;

/// Wire form of a detector push: either a frame or a reported failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DetectorPayload<T> {
    Failure { error: String },
    Frame(T),
}

impl<T> DetectorPayload<T> {
    pub fn into_output(self, detector: DetectorKind) -> DetectorOutput<T> {
        match self {
            Self::Failure { error } => Err(DetectionFailure {
                detector,
                message: error,
            }),
            Self::Frame(frame) => Ok(frame),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectorKind {
    Hand,
    Pose,
}

impl fmt::Display for DetectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hand => f.write_str("hand"),
            Self::Pose => f.write_str("pose"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExerciseType {
    OpeningClosingFist,
    WristFlexionExtension,
    ForearmSupinationPronation,
}

impl ExerciseType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OpeningClosingFist => "OpeningClosingFist",
            Self::WristFlexionExtension => "WristFlexionExtension",
            Self::ForearmSupinationPronation => "ForearmSupinationPronation",
        }
    }

    pub fn needs_pose(self) -> bool {
        matches!(self, Self::WristFlexionExtension)
    }
}

impl FromStr for ExerciseType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "OpeningClosingFist" | "opening_closing_fist" | "fist" => Ok(Self::OpeningClosingFist),
            "WristFlexionExtension" | "wrist_flexion_extension" | "wrist" => {
                Ok(Self::WristFlexionExtension)
            }
            "ForearmSupinationPronation" | "forearm_supination_pronation" | "forearm" => {
                Ok(Self::ForearmSupinationPronation)
            }
            other => Err(format!("unknown exercise type '{other}'")),
        }
    }
}

impl fmt::Display for ExerciseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    pub exercise_type: ExerciseType,
    /// Only consumed by the overlay renderer; the engine carries it through untouched.
    #[serde(default)]
    pub debug_overlay_enabled: bool,
}

impl SessionConfig {
    pub fn new(exercise_type: ExerciseType) -> Self {
        Self {
            exercise_type,
            debug_overlay_enabled: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detector_payload_parses_failure_before_frame() {
        let raw = serde_json::json!({ "error": "model not loaded" });
        let payload: DetectorPayload<HandDetectionResult> = serde_json::from_value(raw).unwrap();
        let output = payload.into_output(DetectorKind::Hand);
        let failure = output.unwrap_err();
        assert_eq!(failure.detector, DetectorKind::Hand);
        assert_eq!(failure.message, "model not loaded");
    }

    #[test]
    fn detector_payload_parses_hand_frame() {
        let raw = serde_json::json!({
            "hands": [{
                "handedness": "Right",
                "landmarks": [{ "x": 0.1, "y": 0.2, "z": 0.0, "visibility": 0.9 }]
            }],
            "timestampMs": 42
        });
        let payload: DetectorPayload<HandDetectionResult> = serde_json::from_value(raw).unwrap();
        let frame = payload.into_output(DetectorKind::Hand).unwrap();
        assert_eq!(frame.timestamp_ms, 42);
        let hand = frame.primary().unwrap();
        assert_eq!(hand.handedness, Handedness::Right);
        assert_eq!(hand.landmarks[0].visibility, Some(0.9));
        assert_eq!(hand.landmarks[0].presence, None);
    }

    #[test]
    fn exercise_type_accepts_short_names() {
        assert_eq!(
            "wrist".parse::<ExerciseType>().unwrap(),
            ExerciseType::WristFlexionExtension
        );
        assert_eq!(
            "ForearmSupinationPronation".parse::<ExerciseType>().unwrap(),
            ExerciseType::ForearmSupinationPronation
        );
        assert!("squat".parse::<ExerciseType>().is_err());
    }

    #[test]
    fn elbow_follows_handedness() {
        assert_eq!(Handedness::Left.elbow_index(), 13);
        assert_eq!(Handedness::Right.elbow_index(), 14);
    }

    #[test]
    fn zero_z_keeps_confidence() {
        let lm = Landmark::new(0.3, 0.4, 0.7).with_visibility(0.5);
        let flat = lm.with_zero_z();
        assert_eq!(flat.z, 0.0);
        assert_eq!(flat.x, 0.3);
        assert_eq!(flat.visibility, Some(0.5));
    }
}
