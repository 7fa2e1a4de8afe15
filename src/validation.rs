//! Input checks for detector frames arriving over the wire.
//! Anything rejected here never reaches the session task.

use crate::engine::types::{HandDetectionResult, Landmark, PoseDetectionResult};

/// Upper bound on landmarks per detection; a pose has 33, a hand 21.
pub const MAX_LANDMARKS_PER_SET: usize = 64;
/// Upper bound on hands or poses per frame.
pub const MAX_SETS_PER_FRAME: usize = 4;

/// Coordinates must be finite; visibility and presence, when given, in [0, 1].
pub fn validate_landmark(lm: &Landmark) -> Result<(), &'static str> {
    if !(lm.x.is_finite() && lm.y.is_finite() && lm.z.is_finite()) {
        return Err("landmark coordinates must be finite numbers");
    }
    let in_unit = |v: Option<f64>| v.map_or(true, |v| (0.0..=1.0).contains(&v));
    if !in_unit(lm.visibility) {
        return Err("landmark visibility must be within [0, 1]");
    }
    if !in_unit(lm.presence) {
        return Err("landmark presence must be within [0, 1]");
    }
    Ok(())
}

pub fn validate_landmarks(landmarks: &[Landmark]) -> Result<(), &'static str> {
    if landmarks.len() > MAX_LANDMARKS_PER_SET {
        return Err("too many landmarks in one detection");
    }
    landmarks.iter().try_for_each(validate_landmark)
}

pub fn validate_hand_frame(frame: &HandDetectionResult) -> Result<(), &'static str> {
    if frame.hands.len() > MAX_SETS_PER_FRAME {
        return Err("too many hands in one frame");
    }
    frame
        .hands
        .iter()
        .try_for_each(|h| validate_landmarks(&h.landmarks))
}

pub fn validate_pose_frame(frame: &PoseDetectionResult) -> Result<(), &'static str> {
    if frame.poses.len() > MAX_SETS_PER_FRAME {
        return Err("too many poses in one frame");
    }
    frame.poses.iter().try_for_each(|p| validate_landmarks(p))
}
