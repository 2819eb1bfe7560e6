//! Exportable mood snapshots.
//!
//! A snapshot captures everything the dashboard needs to draw the current
//! state: the mood label, the shift flag, the baseline and the history as
//! chart points (x = time/label, y = mood index on a fixed `[0, 1]` axis).

use crate::clock::Clock;
use crate::core::{AnomalyState, Baseline, EmotionState, SessionEntry};
use crate::session::MoodSession;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use uuid::Uuid;

/// Snapshot format version.
pub const SNAPSHOT_VERSION: &str = "1.0";

/// The name of this producer.
pub const PRODUCER_NAME: &str = "moodtrack";

/// Producer metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Producer {
    pub name: String,
    pub version: String,
    /// Unique instance identifier (UUID)
    pub instance_id: String,
}

/// One point of the mood trend chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub timestamp: DateTime<Utc>,
    pub label: String,
    /// (valence + energy) / 2
    pub mood_index: f64,
}

impl From<&SessionEntry> for ChartPoint {
    fn from(entry: &SessionEntry) -> Self {
        Self {
            timestamp: entry.timestamp,
            label: entry.label.clone(),
            mood_index: entry.mood_index,
        }
    }
}

/// Summary statistics of the mood index over the history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodSummary {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation, 0 for fewer than two entries
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl MoodSummary {
    /// Summarize a series of mood indices. `None` if it is empty.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let std_dev = if values.len() < 2 {
            0.0
        } else {
            Statistics::std_dev(values.iter())
        };
        Some(Self {
            count: values.len(),
            mean: Statistics::mean(values.iter()),
            std_dev,
            min: Statistics::min(values.iter()),
            max: Statistics::max(values.iter()),
        })
    }
}

/// Serializable view of a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoodSnapshot {
    pub format_version: String,
    pub producer: Producer,
    /// When this payload was computed (RFC3339)
    pub computed_at_utc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    pub emotion: EmotionState,
    pub anomaly: AnomalyState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_distance: Option<f64>,
    pub baseline: Baseline,
    /// Fixed y-axis domain of the chart
    pub mood_index_domain: [f64; 2],
    pub history: Vec<ChartPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<MoodSummary>,
}

/// Builder for mood snapshots.
pub struct SnapshotBuilder {
    instance_id: Uuid,
    session_id: Option<String>,
}

impl SnapshotBuilder {
    /// Create a new builder with a unique instance ID.
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4(),
            session_id: None,
        }
    }

    /// Set the session ID for generated snapshots.
    pub fn with_session_id(mut self, session_id: String) -> Self {
        self.session_id = Some(session_id);
        self
    }

    pub fn instance_id(&self) -> Uuid {
        self.instance_id
    }

    /// Capture the current state of a session.
    pub fn build<C: Clock>(&self, session: &MoodSession<C>) -> MoodSnapshot {
        let history: Vec<ChartPoint> = session.history().iter().map(ChartPoint::from).collect();
        let values: Vec<f64> = history.iter().map(|p| p.mood_index).collect();

        MoodSnapshot {
            format_version: SNAPSHOT_VERSION.to_string(),
            producer: Producer {
                name: PRODUCER_NAME.to_string(),
                version: crate::VERSION.to_string(),
                instance_id: self.instance_id.to_string(),
            },
            computed_at_utc: session.clock().now().to_rfc3339(),
            session_id: self.session_id.clone(),
            emotion: session.latest_emotion_state(),
            anomaly: session.anomaly_state(),
            last_distance: session.last_distance(),
            baseline: session.baseline_snapshot(),
            mood_index_domain: [0.0, 1.0],
            summary: MoodSummary::from_values(&values),
            history,
        }
    }

    /// Build and serialize a snapshot to pretty JSON.
    pub fn build_json<C: Clock>(&self, session: &MoodSession<C>) -> String {
        let snapshot = self.build(session);
        serde_json::to_string_pretty(&snapshot).unwrap_or_else(|_| "{}".to_string())
    }
}

impl Default for SnapshotBuilder {
    fn default() -> Self {
        Self::new()
    }
}
