//! Per-exercise classification of a single hand frame.
//!
//! Everything here is a pure function of the hand landmarks, their
//! handedness and the latest cached pose. The session task owns the
//! resulting [`MetricUpdate`] and decides when to apply it.

use crate::engine::config::EngineConfig;
use crate::engine::error::FrameSkip;
use crate::engine::geometry::{angle_3d, finger_flexion_for, xy_angle, Finger};
use crate::engine::metrics::{ForearmRotation, MetricUpdate, WristMotion};
use crate::engine::types::{
    hand, DetectedHand, ExerciseType, Handedness, Landmark, HAND_LANDMARK_COUNT,
};

/// A hand needs more than this many landmarks to be anatomically complete.
const MIN_HAND_LANDMARKS_EXCLUSIVE: usize = HAND_LANDMARK_COUNT - 1;

pub fn classify(
    exercise: ExerciseType,
    detected: Option<&DetectedHand>,
    pose: Option<&[Landmark]>,
    config: &EngineConfig,
) -> Result<MetricUpdate, FrameSkip> {
    let detected = detected.ok_or(FrameSkip::InsufficientLandmarks {
        found: 0,
        required: MIN_HAND_LANDMARKS_EXCLUSIVE,
    })?;
    let landmarks = detected.landmarks.as_slice();
    if landmarks.len() <= MIN_HAND_LANDMARKS_EXCLUSIVE {
        return Err(FrameSkip::InsufficientLandmarks {
            found: landmarks.len(),
            required: MIN_HAND_LANDMARKS_EXCLUSIVE,
        });
    }

    match exercise {
        ExerciseType::OpeningClosingFist => Ok(classify_fist(landmarks)),
        ExerciseType::WristFlexionExtension => {
            classify_wrist(landmarks, detected.handedness, pose, config)
        }
        ExerciseType::ForearmSupinationPronation => Ok(classify_forearm(landmarks)),
    }
}

/// Landmark count has been checked by the caller.
fn classify_fist(landmarks: &[Landmark]) -> MetricUpdate {
    let flexion = |finger: Finger| {
        finger_flexion_for(landmarks, finger)
            .map(f64::round)
            .unwrap_or(0.0)
    };
    MetricUpdate::Fingers {
        index: flexion(Finger::Index),
        middle: flexion(Finger::Middle),
        ring: flexion(Finger::Ring),
        pinky: flexion(Finger::Pinky),
    }
}

fn classify_wrist(
    landmarks: &[Landmark],
    handedness: Handedness,
    pose: Option<&[Landmark]>,
    config: &EngineConfig,
) -> Result<MetricUpdate, FrameSkip> {
    let elbow = pose
        .and_then(|p| p.get(handedness.elbow_index()))
        .ok_or(FrameSkip::MissingPose { handedness })?;

    // Missing visibility is treated as no confidence at all.
    let visibility = elbow.visibility.unwrap_or(0.0);
    if visibility < config.min_elbow_visibility {
        return Err(FrameSkip::StaleElbowConfidence {
            visibility,
            threshold: config.min_elbow_visibility,
        });
    }

    let pinky = &landmarks[hand::PINKY_MCP];
    let wrist = &landmarks[hand::WRIST];

    let angle = (180.0 - xy_angle(pinky, wrist, elbow)).abs().round();
    if angle > config.max_wrist_angle {
        return Err(FrameSkip::OutOfRangeMeasurement {
            angle,
            limit: config.max_wrist_angle,
        });
    }

    let denominator = wrist.y - elbow.y;
    if denominator.abs() < config.apogee_epsilon {
        return Err(FrameSkip::UndefinedApogee);
    }
    // x of the wrist→elbow line at the pinky's height.
    let x_apogee = wrist.x - (wrist.y - pinky.y) * (wrist.x - elbow.x) / denominator;

    let is_flexion = match handedness {
        Handedness::Left => pinky.x < x_apogee,
        Handedness::Right => pinky.x > x_apogee,
    };
    let motion = if is_flexion {
        WristMotion::Flexion
    } else {
        WristMotion::Extension
    };

    Ok(MetricUpdate::Wrist { motion, angle })
}

fn classify_forearm(landmarks: &[Landmark]) -> MetricUpdate {
    let pinky_mcp = &landmarks[hand::PINKY_MCP];
    let thumb_mcp = &landmarks[hand::THUMB_MCP];
    let thumb_mcp_zero_z = thumb_mcp.with_zero_z();

    let angle = (90.0 - angle_3d(pinky_mcp, thumb_mcp, &thumb_mcp_zero_z))
        .abs()
        .round();

    let rotation = if thumb_mcp.z > pinky_mcp.z {
        ForearmRotation::Supination
    } else {
        ForearmRotation::Pronation
    };

    MetricUpdate::Forearm { rotation, angle }
}
