use std::env;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

use crate::engine::config::EngineConfig;
use crate::engine::types::{ExerciseType, SessionConfig};

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub enable_file_logs: bool,
    pub log_dir: String,
    pub cors_origin: String,
    pub limits: LimitsConfig,
    pub session: SessionEnvConfig,
    pub engine: EngineEnvConfig,
}

#[derive(Debug, Clone)]
pub struct LimitsConfig {
    pub max_sse_connections: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_sse_connections: 16,
        }
    }
}

/// Session started at boot, if any.
#[derive(Debug, Clone, Default)]
pub struct SessionEnvConfig {
    pub exercise_type: Option<ExerciseType>,
    pub debug_overlay_enabled: bool,
}

impl SessionEnvConfig {
    pub fn boot_session(&self) -> Option<SessionConfig> {
        self.exercise_type.map(|exercise_type| SessionConfig {
            exercise_type,
            debug_overlay_enabled: self.debug_overlay_enabled,
        })
    }
}

#[derive(Debug, Clone)]
pub struct EngineEnvConfig {
    pub min_elbow_visibility: f64,
    pub max_wrist_angle: f64,
    pub frame_queue_capacity: usize,
    pub snapshot_capacity: usize,
}

impl Default for EngineEnvConfig {
    fn default() -> Self {
        let engine = EngineConfig::default();
        Self {
            min_elbow_visibility: engine.min_elbow_visibility,
            max_wrist_angle: engine.max_wrist_angle,
            frame_queue_capacity: engine.frame_queue_capacity,
            snapshot_capacity: engine.snapshot_capacity,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let engine_defaults = EngineEnvConfig::default();
        Self {
            host: env_or_parse("HOST", IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))),
            port: env_or_parse("PORT", 3000_u16),
            log_level: env_or("RUST_LOG", "info"),
            enable_file_logs: env_or_bool("ENABLE_FILE_LOGS", false),
            log_dir: env_or("LOG_DIR", "./logs"),
            cors_origin: env_or("CORS_ORIGIN", "http://localhost:5173"),
            limits: LimitsConfig {
                max_sse_connections: env_or_parse(
                    "MAX_SSE_CONNECTIONS",
                    LimitsConfig::default().max_sse_connections,
                ),
            },
            session: SessionEnvConfig {
                exercise_type: env_exercise_type("EXERCISE_TYPE"),
                debug_overlay_enabled: env_or_bool("DEBUG_OVERLAY_ENABLED", false),
            },
            engine: EngineEnvConfig {
                min_elbow_visibility: env_or_parse(
                    "ROM_MIN_ELBOW_VISIBILITY",
                    engine_defaults.min_elbow_visibility,
                ),
                max_wrist_angle: env_or_parse("ROM_MAX_WRIST_ANGLE", engine_defaults.max_wrist_angle),
                frame_queue_capacity: env_or_parse(
                    "ROM_FRAME_QUEUE_CAPACITY",
                    engine_defaults.frame_queue_capacity,
                ),
                snapshot_capacity: env_or_parse(
                    "ROM_SNAPSHOT_CAPACITY",
                    engine_defaults.snapshot_capacity,
                ),
            },
        }
    }
}

pub fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

pub fn env_or_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    match env::var(key) {
        Ok(raw) => match raw.parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!(
                    key,
                    value = %raw,
                    "Failed to parse env var, using default"
                );
                default
            }
        },
        Err(_) => default,
    }
}

pub fn env_or_bool(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        Err(_) => default,
    }
}

fn env_exercise_type(key: &str) -> Option<ExerciseType> {
    let raw = env::var(key).ok()?;
    if raw.trim().is_empty() {
        return None;
    }
    match raw.parse::<ExerciseType>() {
        Ok(exercise) => Some(exercise),
        Err(e) => {
            tracing::warn!(key, value = %raw, error = %e, "Ignoring invalid exercise type");
            None
        }
    }
}
