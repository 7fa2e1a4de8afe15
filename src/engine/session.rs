//! Session aggregation task.
//!
//! Hand and pose detectors push into two bounded queues. A single task drains
//! both, owns the pose cache and the [`SessionMetrics`], and is the only place
//! either is read or written, so no locking is needed around metric state.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::engine::classifier;
use crate::engine::config::EngineConfig;
use crate::engine::emitter::MetricEmitter;
use crate::engine::error::{EngineError, FrameSkip};
use crate::engine::metrics::SessionMetrics;
use crate::engine::types::{
    DetectorKind, DetectorOutput, HandDetectionResult, PoseDetectionResult, SessionConfig,
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    pub hand_frames: u64,
    pub pose_frames: u64,
    pub applied_updates: u64,
    pub snapshots_emitted: u64,
    pub skipped: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionReport {
    pub session_id: String,
    pub config: SessionConfig,
    pub started_at: DateTime<Utc>,
    pub stats: SessionStats,
    pub metrics: SessionMetrics,
}

enum Control {
    Report(oneshot::Sender<SessionReport>),
    Stop,
}

/// Owner side of a running session. Dropping it stops the task.
pub struct SessionHandle {
    id: String,
    config: SessionConfig,
    started_at: DateTime<Utc>,
    hand_tx: mpsc::Sender<DetectorOutput<HandDetectionResult>>,
    pose_tx: mpsc::Sender<DetectorOutput<PoseDetectionResult>>,
    control_tx: mpsc::Sender<Control>,
    task: JoinHandle<SessionReport>,
}

impl SessionHandle {
    /// Spawn the aggregation task on the current tokio runtime.
    pub fn spawn(
        config: SessionConfig,
        engine_config: Arc<EngineConfig>,
        emitter: MetricEmitter,
    ) -> Self {
        let id = uuid::Uuid::new_v4().to_string();
        let started_at = Utc::now();
        let capacity = engine_config.frame_queue_capacity.max(1);

        let (hand_tx, hand_rx) = mpsc::channel(capacity);
        let (pose_tx, pose_rx) = mpsc::channel(capacity);
        let (control_tx, control_rx) = mpsc::channel(4);

        let worker = SessionWorker {
            id: id.clone(),
            config,
            started_at,
            engine_config,
            emitter,
            metrics: SessionMetrics::new(config.exercise_type),
            latest_pose: None,
            stats: SessionStats::default(),
        };

        tracing::info!(
            session_id = %id,
            exercise = %config.exercise_type,
            debug_overlay = config.debug_overlay_enabled,
            "Session started"
        );

        let task = tokio::spawn(worker.run(hand_rx, pose_rx, control_rx));

        Self {
            id,
            config,
            started_at,
            hand_tx,
            pose_tx,
            control_tx,
            task,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn config(&self) -> SessionConfig {
        self.config
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Enqueue a hand detection without waiting. A full queue drops the frame.
    pub fn push_hand(&self, output: DetectorOutput<HandDetectionResult>) -> Result<(), EngineError> {
        try_push(&self.hand_tx, output, DetectorKind::Hand)
    }

    /// Enqueue a pose detection without waiting. A full queue drops the frame.
    pub fn push_pose(&self, output: DetectorOutput<PoseDetectionResult>) -> Result<(), EngineError> {
        try_push(&self.pose_tx, output, DetectorKind::Pose)
    }

    /// Current metrics, after every frame queued before this call.
    pub async fn report(&self) -> Result<SessionReport, EngineError> {
        let (tx, rx) = oneshot::channel();
        self.control_tx
            .send(Control::Report(tx))
            .await
            .map_err(|_| EngineError::SessionClosed)?;
        rx.await.map_err(|_| EngineError::SessionClosed)
    }

    /// Stop the task and return the final metrics.
    pub async fn stop(self) -> Result<SessionReport, EngineError> {
        // The task may already be gone; the join below reports that.
        let _ = self.control_tx.send(Control::Stop).await;
        match self.task.await {
            Ok(report) => Ok(report),
            Err(e) => {
                tracing::error!(session_id = %self.id, error = %e, "Session task failed");
                Err(EngineError::SessionClosed)
            }
        }
    }
}

fn try_push<T>(
    tx: &mpsc::Sender<DetectorOutput<T>>,
    output: DetectorOutput<T>,
    detector: DetectorKind,
) -> Result<(), EngineError> {
    tx.try_send(output).map_err(|e| match e {
        mpsc::error::TrySendError::Full(_) => {
            tracing::warn!(%detector, "Frame queue full, dropping frame");
            EngineError::QueueFull { detector }
        }
        mpsc::error::TrySendError::Closed(_) => EngineError::SessionClosed,
    })
}

struct SessionWorker {
    id: String,
    config: SessionConfig,
    started_at: DateTime<Utc>,
    engine_config: Arc<EngineConfig>,
    emitter: MetricEmitter,
    metrics: SessionMetrics,
    latest_pose: Option<PoseDetectionResult>,
    stats: SessionStats,
}

impl SessionWorker {
    async fn run(
        mut self,
        mut hand_rx: mpsc::Receiver<DetectorOutput<HandDetectionResult>>,
        mut pose_rx: mpsc::Receiver<DetectorOutput<PoseDetectionResult>>,
        mut control_rx: mpsc::Receiver<Control>,
    ) -> SessionReport {
        loop {
            // Pose first so a hand frame sees the newest pose already received;
            // control last so a report covers every frame queued before it.
            tokio::select! {
                biased;
                Some(output) = pose_rx.recv() => self.on_pose(output),
                Some(output) = hand_rx.recv() => self.on_hand(output),
                cmd = control_rx.recv() => match cmd {
                    Some(Control::Report(reply)) => {
                        let _ = reply.send(self.report());
                    }
                    Some(Control::Stop) | None => break,
                },
            }
        }

        tracing::info!(
            session_id = %self.id,
            hand_frames = self.stats.hand_frames,
            applied = self.stats.applied_updates,
            emitted = self.stats.snapshots_emitted,
            "Session stopped"
        );
        self.report()
    }

    fn on_pose(&mut self, output: DetectorOutput<PoseDetectionResult>) {
        self.stats.pose_frames += 1;
        match output {
            Ok(frame) => {
                if self.config.exercise_type.needs_pose() {
                    self.latest_pose = Some(frame);
                }
            }
            Err(failure) => self.record_skip(FrameSkip::from(failure)),
        }
    }

    fn on_hand(&mut self, output: DetectorOutput<HandDetectionResult>) {
        self.stats.hand_frames += 1;

        let frame = match output {
            Ok(frame) => frame,
            Err(failure) => return self.record_skip(FrameSkip::from(failure)),
        };

        let pose = self.latest_pose.as_ref().and_then(PoseDetectionResult::primary);
        let update = match classifier::classify(
            self.config.exercise_type,
            frame.primary(),
            pose,
            &self.engine_config,
        ) {
            Ok(update) => update,
            Err(skip) => return self.record_skip(skip),
        };

        if !self.metrics.apply(&update) {
            return;
        }
        self.stats.applied_updates += 1;

        if self
            .emitter
            .emit(&self.id, &self.metrics, frame.timestamp_ms)
            .is_some()
        {
            self.stats.snapshots_emitted += 1;
        }
    }

    fn record_skip(&mut self, skip: FrameSkip) {
        match &skip {
            FrameSkip::DetectionFailure(failure) => {
                tracing::warn!(session_id = %self.id, error = %failure, "Skipping frame");
            }
            other => {
                tracing::debug!(session_id = %self.id, reason = other.as_str(), detail = %other, "Skipping frame");
            }
        }
        *self
            .stats
            .skipped
            .entry(skip.as_str().to_string())
            .or_insert(0) += 1;
    }

    fn report(&self) -> SessionReport {
        SessionReport {
            session_id: self.id.clone(),
            config: self.config,
            started_at: self.started_at,
            stats: self.stats.clone(),
            metrics: self.metrics.clone(),
        }
    }
}
