use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::engine::metrics::SessionMetrics;
use crate::engine::types::ExerciseType;

/// Metrics with a current value at the time a frame was applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSnapshot {
    pub session_id: String,
    pub exercise: ExerciseType,
    pub timestamp_ms: i64,
    pub metrics: BTreeMap<String, f64>,
}

/// Injected output handle for metric snapshots.
///
/// Publishing never waits on subscribers: a slow receiver lags and loses the
/// oldest snapshots instead of stalling the detection path.
#[derive(Debug, Clone)]
pub struct MetricEmitter {
    tx: broadcast::Sender<MetricSnapshot>,
}

impl MetricEmitter {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MetricSnapshot> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Build a snapshot from `metrics` and publish it if any metric is current.
    ///
    /// Returns the snapshot that was published, if any.
    pub fn emit(
        &self,
        session_id: &str,
        metrics: &SessionMetrics,
        timestamp_ms: i64,
    ) -> Option<MetricSnapshot> {
        let values = metrics.current_values();
        if values.is_empty() {
            return None;
        }

        let snapshot = MetricSnapshot {
            session_id: session_id.to_string(),
            exercise: metrics.exercise_type(),
            timestamp_ms,
            metrics: values,
        };

        match self.tx.send(snapshot.clone()) {
            Ok(receivers) => {
                tracing::trace!(session_id, receivers, "Published metric snapshot");
            }
            Err(_) => {
                tracing::trace!(session_id, "No subscribers for metric snapshot");
            }
        }
        Some(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::metrics::{MetricUpdate, WristMotion};

    #[tokio::test]
    async fn emits_only_current_metrics() {
        let emitter = MetricEmitter::new(8);
        let mut rx = emitter.subscribe();

        let mut metrics = SessionMetrics::new(ExerciseType::WristFlexionExtension);
        metrics.apply(&MetricUpdate::Wrist {
            motion: WristMotion::Flexion,
            angle: 20.0,
        });

        let sent = emitter.emit("s1", &metrics, 100).expect("snapshot");
        let received = rx.recv().await.expect("recv");
        assert_eq!(sent, received);
        assert_eq!(received.metrics.len(), 1);
        assert_eq!(received.metrics.get("flexion"), Some(&20.0));
        assert!(!received.metrics.contains_key("extension"));
    }

    #[tokio::test]
    async fn nothing_emitted_without_current_values() {
        let emitter = MetricEmitter::new(8);
        let mut rx = emitter.subscribe();
        let metrics = SessionMetrics::new(ExerciseType::OpeningClosingFist);

        assert!(emitter.emit("s1", &metrics, 1).is_none());
        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[test]
    fn emit_without_subscribers_does_not_fail() {
        let emitter = MetricEmitter::new(1);
        let mut metrics = SessionMetrics::new(ExerciseType::OpeningClosingFist);
        metrics.apply(&MetricUpdate::Fingers {
            index: 10.0,
            middle: 20.0,
            ring: 30.0,
            pinky: 40.0,
        });
        let snapshot = emitter.emit("s1", &metrics, 5).expect("snapshot");
        assert_eq!(snapshot.metrics.len(), 4);
        assert_eq!(emitter.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn lagging_subscriber_does_not_block_publisher() {
        let emitter = MetricEmitter::new(2);
        let mut rx = emitter.subscribe();
        let mut metrics = SessionMetrics::new(ExerciseType::WristFlexionExtension);
        for angle in [10.0, 20.0, 30.0, 40.0] {
            metrics.apply(&MetricUpdate::Wrist {
                motion: WristMotion::Extension,
                angle,
            });
            emitter.emit("s1", &metrics, angle as i64);
        }

        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Lagged(2))
        ));
        let latest = rx.recv().await.expect("recv after lag");
        assert_eq!(latest.metrics.get("extension"), Some(&30.0));
    }
}
