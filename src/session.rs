//! A mood-tracking session: history, baseline engine and clock in one place.
//!
//! Sessions are plain values with no shared state, so several can run side
//! by side and tests can drive one with a [`ManualClock`](crate::clock::ManualClock).
//! `submit_sample` takes `&mut self`, which serializes updates to a
//! session's baseline.

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::core::{
    AnomalyState, AnomalyTransition, Baseline, BaselineEngine, EmotionState, EngineConfig,
    EngineUpdate, FeatureSample, MoodLabel, SessionEntry, SessionHistory,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Result of submitting one sample.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleOutcome {
    /// The entry appended to the history
    pub entry: SessionEntry,
    /// Engine state change caused by the entry
    pub update: EngineUpdate,
    /// How many old entries were evicted to make room
    pub evicted: usize,
}

/// Context handed to the journal when the user answers a mood-shift prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalTrigger {
    /// Track that triggered the shift
    pub trigger_label: String,
    /// Mood detected for that track
    pub detected_emotion: MoodLabel,
    /// Distance from the baseline at detection time
    pub distance: f64,
    pub detected_at: DateTime<Utc>,
}

/// Explicit session state for the mood pipeline.
pub struct MoodSession<C: Clock = SystemClock> {
    history: SessionHistory,
    engine: BaselineEngine,
    clock: C,
    /// Journal context of the latest anomalous sample, independent of the history
    pending_journal: Option<JournalTrigger>,
}

impl MoodSession<SystemClock> {
    /// Create a session stamped with wall-clock time.
    pub fn new(engine: EngineConfig, history_capacity: usize) -> Self {
        Self::with_clock(engine, history_capacity, SystemClock)
    }

    /// Create a session from the application configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.engine, config.history_capacity)
    }
}

impl Default for MoodSession<SystemClock> {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl<C: Clock> MoodSession<C> {
    /// Create a session with a custom time source.
    pub fn with_clock(engine: EngineConfig, history_capacity: usize, clock: C) -> Self {
        Self {
            history: SessionHistory::new(history_capacity),
            engine: BaselineEngine::new(engine),
            clock,
            pending_journal: None,
        }
    }

    /// Ingest one sample: append it to the history and update the baseline.
    pub fn submit_sample(
        &mut self,
        features: FeatureSample,
        label: impl Into<String>,
    ) -> SampleOutcome {
        let (entry, evicted) = self.history.append(features, label, self.clock.now());
        let update = self.engine.apply(&entry.features);

        debug!(
            track = %entry.label,
            valence = entry.features.valence,
            energy = entry.features.energy,
            mood_index = entry.mood_index,
            evicted,
            "sample submitted"
        );

        match update.transition {
            Some(AnomalyTransition::Raised) => info!(
                track = %entry.label,
                mood = %update.emotion.label,
                distance = update.distance,
                "mood shift detected"
            ),
            Some(AnomalyTransition::Cleared) => info!(
                track = %entry.label,
                distance = update.distance,
                "mood back within baseline"
            ),
            None => {}
        }

        self.pending_journal = update.anomalous.then(|| JournalTrigger {
            trigger_label: entry.label.clone(),
            detected_emotion: update.emotion.label,
            distance: update.distance,
            detected_at: entry.timestamp,
        });

        SampleOutcome {
            entry,
            update,
            evicted,
        }
    }

    /// Mood of the latest sample (Neutral before any sample).
    pub fn latest_emotion_state(&self) -> EmotionState {
        self.engine.emotion()
    }

    pub fn is_anomalous(&self) -> bool {
        self.engine.is_anomalous()
    }

    pub fn anomaly_state(&self) -> AnomalyState {
        self.engine.anomaly_state()
    }

    /// Copy of the current baseline.
    pub fn baseline_snapshot(&self) -> Baseline {
        self.engine.baseline()
    }

    /// All history entries, oldest first.
    pub fn history_snapshot(&self) -> Vec<SessionEntry> {
        self.history.all()
    }

    pub fn history(&self) -> &SessionHistory {
        &self.history
    }

    pub fn latest_entry(&self) -> Option<&SessionEntry> {
        self.history.latest()
    }

    /// Distance of the latest sample from its pre-update baseline.
    pub fn last_distance(&self) -> Option<f64> {
        self.engine.last_distance()
    }

    pub fn samples_seen(&self) -> u64 {
        self.engine.samples_seen()
    }

    pub fn engine_config(&self) -> &EngineConfig {
        self.engine.config()
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// What the journal should record if the user answers the prompt now.
    ///
    /// `None` unless the session is currently shifted. Survives
    /// [`clear_history`](Self::clear_history).
    pub fn journal_trigger(&self) -> Option<JournalTrigger> {
        if !self.is_anomalous() {
            return None;
        }
        self.pending_journal.clone()
    }

    /// The user has responded to the prompt; clear the flag until the next sample.
    pub fn acknowledge_anomaly(&mut self) -> bool {
        let cleared = self.engine.acknowledge();
        self.pending_journal = None;
        if cleared {
            debug!("mood shift acknowledged");
        }
        cleared
    }

    /// Forget the history (e.g. after a disconnect). The baseline, the
    /// anomaly flag and its journal context are kept.
    pub fn clear_history(&mut self) {
        self.history.clear();
        debug!("session history cleared");
    }
}
