use serde::{Deserialize, Serialize};

use crate::config::EngineEnvConfig;

/// Tuning knobs for classification and session plumbing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    /// Elbow samples below this visibility are discarded and prior values kept.
    pub min_elbow_visibility: f64,
    /// Wrist angles above this bound are treated as noise and discarded.
    /// Defaults to 90; the bound has no documented biomechanical basis.
    pub max_wrist_angle: f64,
    /// Minimum |wrist.y - elbow.y| for the apogee interpolation.
    pub apogee_epsilon: f64,
    /// Capacity of each detector queue feeding a session.
    pub frame_queue_capacity: usize,
    /// Snapshots retained for lagging subscribers.
    pub snapshot_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_elbow_visibility: 0.2,
            max_wrist_angle: 90.0,
            apogee_epsilon: 1e-6,
            frame_queue_capacity: 64,
            snapshot_capacity: 256,
        }
    }
}

impl EngineConfig {
    pub fn from_env(env_config: &EngineEnvConfig) -> Self {
        Self {
            min_elbow_visibility: env_config.min_elbow_visibility,
            max_wrist_angle: env_config.max_wrist_angle,
            frame_queue_capacity: env_config.frame_queue_capacity,
            snapshot_capacity: env_config.snapshot_capacity,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.min_elbow_visibility) {
            return Err("min_elbow_visibility must be in [0,1]".to_string());
        }
        if !(0.0..=180.0).contains(&self.max_wrist_angle) {
            return Err("max_wrist_angle must be in [0,180]".to_string());
        }
        if !(self.apogee_epsilon > 0.0 && self.apogee_epsilon.is_finite()) {
            return Err("apogee_epsilon must be a positive finite number".to_string());
        }
        if self.frame_queue_capacity == 0 {
            return Err("frame_queue_capacity must be > 0".to_string());
        }
        if self.snapshot_capacity == 0 {
            return Err("snapshot_capacity must be > 0".to_string());
        }
        Ok(())
    }
}
