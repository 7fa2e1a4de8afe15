use serde_json::{json, Value};

use rom_engine::engine::types::hand;
use rom_engine::engine::Landmark;

const FINGER_CHAINS: [[usize; 4]; 4] = [
    [hand::INDEX_MCP, hand::INDEX_PIP, hand::INDEX_DIP, hand::INDEX_TIP],
    [hand::MIDDLE_MCP, hand::MIDDLE_PIP, hand::MIDDLE_DIP, hand::MIDDLE_TIP],
    [hand::RING_MCP, hand::RING_PIP, hand::RING_DIP, hand::RING_TIP],
    [hand::PINKY_MCP, hand::PINKY_PIP, hand::PINKY_DIP, hand::PINKY_TIP],
];

fn base_hand() -> Vec<Landmark> {
    vec![Landmark::new(0.5, 0.5, 0.0); 21]
}

fn hand_json(handedness: &str, landmarks: &[Landmark], ts: i64) -> Value {
    json!({
        "hands": [{ "handedness": handedness, "landmarks": landmarks }],
        "timestampMs": ts,
    })
}

/// Every finger bent so its MCP, PIP and DIP interior angles (YZ plane)
/// are `joint_deg` each; total flexion is `3 * joint_deg`.
pub fn fist_landmarks(joint_deg: f64) -> Vec<Landmark> {
    let mut landmarks = base_hand();
    let wrist = landmarks[hand::WRIST];
    let step = 0.05;
    for chain in FINGER_CHAINS {
        let mut heading: f64 = 0.0;
        let mut prev = wrist;
        for (i, idx) in chain.iter().enumerate() {
            if i > 0 {
                heading += (180.0 - joint_deg).to_radians();
            }
            let next = Landmark::new(
                prev.x,
                prev.y + step * heading.cos(),
                prev.z + step * heading.sin(),
            );
            landmarks[*idx] = next;
            prev = next;
        }
    }
    landmarks
}

pub fn fist_frame(joint_deg: f64, ts: i64) -> Value {
    hand_json("Right", &fist_landmarks(joint_deg), ts)
}

/// Elbow straight below the wrist (+y); pinky bent `deg` towards -x.
pub fn wrist_hand_frame(deg: f64, handedness: &str, ts: i64) -> Value {
    let mut landmarks = base_hand();
    let wrist = Landmark::new(0.5, 0.6, 0.0);
    let phi = (180.0 - deg).to_radians();
    landmarks[hand::WRIST] = wrist;
    landmarks[hand::PINKY_MCP] =
        Landmark::new(wrist.x - 0.1 * phi.sin(), wrist.y + 0.1 * phi.cos(), 0.0);
    hand_json(handedness, &landmarks, ts)
}

/// Full-body pose with the elbow at `elbow_index` reported at `visibility`.
pub fn pose_frame(elbow_index: usize, visibility: f64, ts: i64) -> Value {
    let mut pose = vec![Landmark::new(0.5, 0.5, 0.0).with_visibility(0.9); 33];
    pose[elbow_index] = Landmark::new(0.5, 0.9, 0.0).with_visibility(visibility);
    json!({ "poses": [pose], "timestampMs": ts })
}

/// Thumb MCP 0.1 deeper than pinky MCP (or shallower when `swap`); both
/// give a 27° rotation.
pub fn forearm_frame(swap: bool, ts: i64) -> Value {
    let mut landmarks = base_hand();
    let (pinky_z, thumb_z) = if swap { (0.2, 0.1) } else { (0.1, 0.2) };
    landmarks[hand::PINKY_MCP] = Landmark::new(0.4, 0.5, pinky_z);
    landmarks[hand::THUMB_MCP] = Landmark::new(0.6, 0.5, thumb_z);
    hand_json("Right", &landmarks, ts)
}
