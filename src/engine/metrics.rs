use std::collections::BTreeMap;

use serde::Serialize;

use crate::engine::geometry::Finger;
use crate::engine::types::ExerciseType;

/// One tracked quantity with its running extremes.
///
/// `min`/`max` survive `clear_current`, so a session keeps its historical
/// range even while the metric is inactive.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metric {
    pub name: &'static str,
    pub current: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Metric {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            current: None,
            min: None,
            max: None,
        }
    }

    pub fn observe(&mut self, value: f64) {
        self.current = Some(value);
        self.min = Some(self.min.map_or(value, |m| m.min(value)));
        self.max = Some(self.max.map_or(value, |m| m.max(value)));
    }

    pub fn clear_current(&mut self) {
        self.current = None;
    }

    pub fn is_consistent(&self) -> bool {
        match (self.current, self.min, self.max) {
            (None, _, _) => true,
            (Some(c), Some(lo), Some(hi)) => lo <= c && c <= hi,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WristMotion {
    Flexion,
    Extension,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ForearmRotation {
    Supination,
    Pronation,
}

/// Result of classifying one eligible frame, applied atomically by the session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum MetricUpdate {
    Fingers {
        index: f64,
        middle: f64,
        ring: f64,
        pinky: f64,
    },
    Wrist {
        motion: WristMotion,
        angle: f64,
    },
    Forearm {
        rotation: ForearmRotation,
        angle: f64,
    },
}

impl MetricUpdate {
    pub fn finger(&self, finger: Finger) -> Option<f64> {
        match (self, finger) {
            (Self::Fingers { index, .. }, Finger::Index) => Some(*index),
            (Self::Fingers { middle, .. }, Finger::Middle) => Some(*middle),
            (Self::Fingers { ring, .. }, Finger::Ring) => Some(*ring),
            (Self::Fingers { pinky, .. }, Finger::Pinky) => Some(*pinky),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FistMetrics {
    pub index: Metric,
    pub middle: Metric,
    pub ring: Metric,
    pub pinky: Metric,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WristMetrics {
    pub flexion: Metric,
    pub extension: Metric,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForearmMetrics {
    pub supination: Metric,
    pub pronation: Metric,
}

/// Per-session metric store, shaped by the exercise being performed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "exercise")]
pub enum SessionMetrics {
    #[serde(rename = "OpeningClosingFist")]
    Fist(FistMetrics),
    #[serde(rename = "WristFlexionExtension")]
    Wrist(WristMetrics),
    #[serde(rename = "ForearmSupinationPronation")]
    Forearm(ForearmMetrics),
}

fn set_exclusive(active: &mut Metric, inactive: &mut Metric, value: f64) {
    active.observe(value);
    inactive.clear_current();
}

impl SessionMetrics {
    pub fn new(exercise: ExerciseType) -> Self {
        match exercise {
            ExerciseType::OpeningClosingFist => Self::Fist(FistMetrics {
                index: Metric::new(Finger::Index.as_str()),
                middle: Metric::new(Finger::Middle.as_str()),
                ring: Metric::new(Finger::Ring.as_str()),
                pinky: Metric::new(Finger::Pinky.as_str()),
            }),
            ExerciseType::WristFlexionExtension => Self::Wrist(WristMetrics {
                flexion: Metric::new("flexion"),
                extension: Metric::new("extension"),
            }),
            ExerciseType::ForearmSupinationPronation => Self::Forearm(ForearmMetrics {
                supination: Metric::new("supination"),
                pronation: Metric::new("pronation"),
            }),
        }
    }

    pub fn exercise_type(&self) -> ExerciseType {
        match self {
            Self::Fist(_) => ExerciseType::OpeningClosingFist,
            Self::Wrist(_) => ExerciseType::WristFlexionExtension,
            Self::Forearm(_) => ExerciseType::ForearmSupinationPronation,
        }
    }

    pub fn metrics(&self) -> Vec<&Metric> {
        match self {
            Self::Fist(m) => vec![&m.index, &m.middle, &m.ring, &m.pinky],
            Self::Wrist(m) => vec![&m.flexion, &m.extension],
            Self::Forearm(m) => vec![&m.supination, &m.pronation],
        }
    }

    pub fn get(&self, name: &str) -> Option<&Metric> {
        self.metrics().into_iter().find(|m| m.name == name)
    }

    /// Apply a classifier update. Returns `false` if the update belongs to a
    /// different exercise and was ignored.
    pub fn apply(&mut self, update: &MetricUpdate) -> bool {
        match (self, update) {
            (
                Self::Fist(m),
                MetricUpdate::Fingers {
                    index,
                    middle,
                    ring,
                    pinky,
                },
            ) => {
                m.index.observe(*index);
                m.middle.observe(*middle);
                m.ring.observe(*ring);
                m.pinky.observe(*pinky);
                true
            }
            (Self::Wrist(m), MetricUpdate::Wrist { motion, angle }) => {
                match motion {
                    WristMotion::Flexion => set_exclusive(&mut m.flexion, &mut m.extension, *angle),
                    WristMotion::Extension => {
                        set_exclusive(&mut m.extension, &mut m.flexion, *angle)
                    }
                }
                true
            }
            (Self::Forearm(m), MetricUpdate::Forearm { rotation, angle }) => {
                match rotation {
                    ForearmRotation::Supination => {
                        set_exclusive(&mut m.supination, &mut m.pronation, *angle)
                    }
                    ForearmRotation::Pronation => {
                        set_exclusive(&mut m.pronation, &mut m.supination, *angle)
                    }
                }
                true
            }
            (metrics, update) => {
                tracing::warn!(
                    exercise = %metrics.exercise_type(),
                    ?update,
                    "Ignoring metric update for a different exercise"
                );
                false
            }
        }
    }

    /// Name → current value for every metric that currently has one.
    pub fn current_values(&self) -> BTreeMap<String, f64> {
        self.metrics()
            .into_iter()
            .filter_map(|m| m.current.map(|v| (m.name.to_string(), v)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_observation_seeds_both_extremes() {
        let mut metric = Metric::new("index");
        metric.observe(45.0);
        assert_eq!(metric.current, Some(45.0));
        assert_eq!(metric.min, Some(45.0));
        assert_eq!(metric.max, Some(45.0));
    }

    #[test]
    fn extremes_widen_and_never_shrink() {
        let mut metric = Metric::new("index");
        for v in [45.0, 30.0, 60.0, 50.0] {
            metric.observe(v);
            assert!(metric.is_consistent());
        }
        assert_eq!(metric.current, Some(50.0));
        assert_eq!(metric.min, Some(30.0));
        assert_eq!(metric.max, Some(60.0));
    }

    #[test]
    fn cleared_metric_keeps_history() {
        let mut metric = Metric::new("flexion");
        metric.observe(20.0);
        metric.clear_current();
        assert_eq!(metric.current, None);
        assert_eq!(metric.max, Some(20.0));
        assert!(metric.is_consistent());
    }

    #[test]
    fn wrist_update_is_mutually_exclusive() {
        let mut metrics = SessionMetrics::new(ExerciseType::WristFlexionExtension);
        assert!(metrics.apply(&MetricUpdate::Wrist {
            motion: WristMotion::Flexion,
            angle: 20.0,
        }));
        assert!(metrics.apply(&MetricUpdate::Wrist {
            motion: WristMotion::Extension,
            angle: 35.0,
        }));

        let flexion = metrics.get("flexion").unwrap();
        let extension = metrics.get("extension").unwrap();
        assert_eq!(flexion.current, None);
        assert_eq!(flexion.max, Some(20.0));
        assert_eq!(extension.current, Some(35.0));

        let values = metrics.current_values();
        assert_eq!(values.len(), 1);
        assert_eq!(values.get("extension"), Some(&35.0));
    }

    #[test]
    fn mismatched_update_is_ignored() {
        let mut metrics = SessionMetrics::new(ExerciseType::OpeningClosingFist);
        let before = metrics.clone();
        let applied = metrics.apply(&MetricUpdate::Forearm {
            rotation: ForearmRotation::Supination,
            angle: 10.0,
        });
        assert!(!applied);
        assert_eq!(metrics, before);
        assert!(metrics.current_values().is_empty());
    }

    #[test]
    fn serializes_with_exercise_tag() {
        let metrics = SessionMetrics::new(ExerciseType::ForearmSupinationPronation);
        let json = serde_json::to_value(&metrics).unwrap();
        assert_eq!(json["exercise"], "ForearmSupinationPronation");
        assert_eq!(json["supination"]["name"], "supination");
        assert!(json["pronation"]["current"].is_null());
    }
}
