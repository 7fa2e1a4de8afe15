pub mod classifier;
pub mod config;
pub mod emitter;
pub mod error;
pub mod geometry;
pub mod metrics;
pub mod session;
pub mod types;

pub use config::EngineConfig;
pub use emitter::{MetricEmitter, MetricSnapshot};
pub use error::{DetectionFailure, EngineError, FrameSkip};
pub use metrics::{Metric, MetricUpdate, SessionMetrics};
pub use session::{SessionHandle, SessionReport};
pub use types::{
    DetectedHand, ExerciseType, HandDetectionResult, Handedness, Landmark, PoseDetectionResult,
    SessionConfig,
};
