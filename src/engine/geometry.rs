//! Joint angle geometry over normalized landmarks.
//!
//! Angles are measured at a vertex between two rays, either in a 2-axis
//! projection or in full 3D. Degenerate input (a zero-length ray) yields 0
//! instead of NaN so callers never need to special-case it.

use serde::{Deserialize, Serialize};

use crate::engine::types::{hand, Landmark};

/// Which axes take part in an angle computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnglePlane {
    XY,
    YZ,
    XZ,
    Xyz,
}

impl AnglePlane {
    fn project(self, lm: &Landmark) -> [f64; 3] {
        match self {
            Self::XY => [lm.x, lm.y, 0.0],
            Self::YZ => [0.0, lm.y, lm.z],
            Self::XZ => [lm.x, 0.0, lm.z],
            Self::Xyz => [lm.x, lm.y, lm.z],
        }
    }
}

fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// Euclidean length, scaled by the largest component so large finite
/// coordinates do not overflow when squared.
fn norm(a: [f64; 3]) -> f64 {
    let scale = a.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
    if scale == 0.0 || !scale.is_finite() {
        return scale;
    }
    let scaled = a.map(|v| v / scale);
    scale * dot(scaled, scaled).sqrt()
}

/// Unit vector along `a`, or `None` for a zero-length or non-finite ray.
fn unit(a: [f64; 3]) -> Option<[f64; 3]> {
    let mag = norm(a);
    mag.is_normal().then(|| a.map(|v| v / mag))
}

/// Angle in degrees at `b` between rays `b→a` and `b→c`, within `[0, 180]`.
///
/// cos(θ) = (v1 · v2) / (|v1| × |v2|), taken over the unit rays and clamped
/// to [-1, 1] before `acos`.
pub fn angle(a: &Landmark, b: &Landmark, c: &Landmark, plane: AnglePlane) -> f64 {
    let vertex = plane.project(b);
    let v1 = sub(plane.project(a), vertex);
    let v2 = sub(plane.project(c), vertex);

    // Zero, subnormal or non-finite rays count as degenerate.
    let (Some(u1), Some(u2)) = (unit(v1), unit(v2)) else {
        return 0.0;
    };

    dot(u1, u2).clamp(-1.0, 1.0).acos().to_degrees()
}

pub fn xy_angle(a: &Landmark, b: &Landmark, c: &Landmark) -> f64 {
    angle(a, b, c, AnglePlane::XY)
}

pub fn yz_angle(a: &Landmark, b: &Landmark, c: &Landmark) -> f64 {
    angle(a, b, c, AnglePlane::YZ)
}

pub fn xz_angle(a: &Landmark, b: &Landmark, c: &Landmark) -> f64 {
    angle(a, b, c, AnglePlane::XZ)
}

pub fn angle_3d(a: &Landmark, b: &Landmark, c: &Landmark) -> f64 {
    angle(a, b, c, AnglePlane::Xyz)
}

/// Total curl of one finger: YZ angles at MCP, PIP and DIP summed.
///
/// The YZ projection stands in for the sagittal plane, where curl stays
/// visible regardless of hand roll.
pub fn finger_flexion(
    wrist: &Landmark,
    mcp: &Landmark,
    pip: &Landmark,
    dip: &Landmark,
    tip: &Landmark,
) -> f64 {
    yz_angle(wrist, mcp, pip) + yz_angle(mcp, pip, dip) + yz_angle(pip, dip, tip)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Finger {
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; 4] = [Self::Index, Self::Middle, Self::Ring, Self::Pinky];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Index => "index",
            Self::Middle => "middle",
            Self::Ring => "ring",
            Self::Pinky => "pinky",
        }
    }

    /// MCP, PIP, DIP and tip landmark indices.
    pub fn chain(self) -> [usize; 4] {
        match self {
            Self::Index => [hand::INDEX_MCP, hand::INDEX_PIP, hand::INDEX_DIP, hand::INDEX_TIP],
            Self::Middle => [
                hand::MIDDLE_MCP,
                hand::MIDDLE_PIP,
                hand::MIDDLE_DIP,
                hand::MIDDLE_TIP,
            ],
            Self::Ring => [hand::RING_MCP, hand::RING_PIP, hand::RING_DIP, hand::RING_TIP],
            Self::Pinky => [hand::PINKY_MCP, hand::PINKY_PIP, hand::PINKY_DIP, hand::PINKY_TIP],
        }
    }
}

/// Flexion of `finger` read from a full hand landmark list.
///
/// Returns `None` when the list is too short to contain the finger.
pub fn finger_flexion_for(landmarks: &[Landmark], finger: Finger) -> Option<f64> {
    let [mcp, pip, dip, tip] = finger.chain();
    Some(finger_flexion(
        landmarks.get(hand::WRIST)?,
        landmarks.get(mcp)?,
        landmarks.get(pip)?,
        landmarks.get(dip)?,
        landmarks.get(tip)?,
    ))
}
