//! Personal baseline tracking and mood-shift detection.
//!
//! The baseline is an exponential moving average of (valence, energy). Each
//! new history entry is judged against the baseline as it stood *before*
//! that entry was folded in, then the baseline moves toward the entry.
//!
//! The anomaly signal has no hysteresis: a sequence oscillating around the
//! threshold flips the flag on every sample.

use crate::core::classify::{classify, EmotionState};
use crate::core::features::{FeatureSample, NEUTRAL_FEATURE_VALUE};
use crate::core::history::SessionHistory;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Default smoothing factor.
pub const DEFAULT_LEARNING_RATE: f64 = 0.1;

/// Default Euclidean cutoff in the valence/energy unit square.
pub const DEFAULT_ANOMALY_THRESHOLD: f64 = 0.35;

/// Running estimate of the user's typical valence and energy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    pub valence: f64,
    pub energy: f64,
}

impl Default for Baseline {
    fn default() -> Self {
        Self {
            valence: NEUTRAL_FEATURE_VALUE,
            energy: NEUTRAL_FEATURE_VALUE,
        }
    }
}

impl Baseline {
    /// Euclidean distance from this baseline to a sample.
    pub fn distance_to(&self, sample: &FeatureSample) -> f64 {
        let dv = sample.valence - self.valence;
        let de = sample.energy - self.energy;
        (dv * dv + de * de).sqrt()
    }

    /// The baseline after folding in `sample` with smoothing factor `alpha`.
    pub fn smoothed(&self, sample: &FeatureSample, alpha: f64) -> Self {
        Self {
            valence: self.valence * (1.0 - alpha) + sample.valence * alpha,
            energy: self.energy * (1.0 - alpha) + sample.energy * alpha,
        }
    }
}

/// Engine tunables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Smoothing factor in (0, 1]; higher adapts faster
    pub baseline_learning_rate: f64,
    /// Distance above which a sample counts as a mood shift
    pub anomaly_threshold: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            baseline_learning_rate: DEFAULT_LEARNING_RATE,
            anomaly_threshold: DEFAULT_ANOMALY_THRESHOLD,
        }
    }
}

impl EngineConfig {
    /// Check that the tunables are usable.
    pub fn validate(&self) -> Result<(), EngineConfigError> {
        let alpha = self.baseline_learning_rate;
        if !(alpha.is_finite() && alpha > 0.0 && alpha <= 1.0) {
            return Err(EngineConfigError::LearningRate(alpha));
        }
        if !(self.anomaly_threshold.is_finite() && self.anomaly_threshold >= 0.0) {
            return Err(EngineConfigError::Threshold(self.anomaly_threshold));
        }
        Ok(())
    }
}

/// Invalid engine tunables.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineConfigError {
    LearningRate(f64),
    Threshold(f64),
}

impl fmt::Display for EngineConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineConfigError::LearningRate(v) => {
                write!(f, "baseline learning rate must be in (0, 1], got {v}")
            }
            EngineConfigError::Threshold(v) => {
                write!(f, "anomaly threshold must be a non-negative number, got {v}")
            }
        }
    }
}

impl std::error::Error for EngineConfigError {}

/// Two-state anomaly signal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyState {
    #[default]
    Stable,
    Shifted,
}

impl AnomalyState {
    fn from_flag(anomalous: bool) -> Self {
        if anomalous {
            AnomalyState::Shifted
        } else {
            AnomalyState::Stable
        }
    }

    pub fn is_shifted(self) -> bool {
        self == AnomalyState::Shifted
    }
}

/// A change of the anomaly state caused by one sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyTransition {
    /// Stable to Shifted
    Raised,
    /// Shifted to Stable
    Cleared,
}

/// Outcome of processing one history entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineUpdate {
    pub emotion: EmotionState,
    /// Distance from the pre-update baseline
    pub distance: f64,
    pub anomalous: bool,
    pub baseline_before: Baseline,
    pub baseline_after: Baseline,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transition: Option<AnomalyTransition>,
}

/// Owns the baseline and the current emotion/anomaly state.
#[derive(Debug, Clone)]
pub struct BaselineEngine {
    config: EngineConfig,
    baseline: Baseline,
    emotion: EmotionState,
    anomaly: AnomalyState,
    last_distance: Option<f64>,
    samples_seen: u64,
}

impl BaselineEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            baseline: Baseline::default(),
            emotion: EmotionState::neutral(),
            anomaly: AnomalyState::Stable,
            last_distance: None,
            samples_seen: 0,
        }
    }

    /// Process the latest history entry.
    ///
    /// Returns `None` and leaves the state untouched when the history is
    /// empty. Must be called once per appended entry.
    pub fn on_new_sample(&mut self, history: &SessionHistory) -> Option<EngineUpdate> {
        let sample = history.latest()?.features;
        Some(self.apply(&sample))
    }

    /// Process one sample that has just been appended to the history.
    pub fn apply(&mut self, sample: &FeatureSample) -> EngineUpdate {
        let emotion = classify(sample);
        let baseline_before = self.baseline;
        let distance = baseline_before.distance_to(sample);
        let baseline_after = baseline_before.smoothed(sample, self.config.baseline_learning_rate);
        let anomalous = distance > self.config.anomaly_threshold;

        let next = AnomalyState::from_flag(anomalous);
        let transition = match (self.anomaly, next) {
            (AnomalyState::Stable, AnomalyState::Shifted) => Some(AnomalyTransition::Raised),
            (AnomalyState::Shifted, AnomalyState::Stable) => Some(AnomalyTransition::Cleared),
            _ => None,
        };

        self.baseline = baseline_after;
        self.emotion = emotion;
        self.anomaly = next;
        self.last_distance = Some(distance);
        self.samples_seen += 1;

        debug!(
            mood = %emotion.label,
            distance,
            anomalous,
            baseline_valence = baseline_after.valence,
            baseline_energy = baseline_after.energy,
            "baseline updated"
        );

        EngineUpdate {
            emotion,
            distance,
            anomalous,
            baseline_before,
            baseline_after,
            transition,
        }
    }

    /// Clear the anomaly flag without touching the baseline.
    ///
    /// Used once the user has responded to the journal prompt; the next
    /// sample recomputes the flag as usual.
    pub fn acknowledge(&mut self) -> bool {
        let was_shifted = self.anomaly.is_shifted();
        self.anomaly = AnomalyState::Stable;
        was_shifted
    }

    pub fn baseline(&self) -> Baseline {
        self.baseline
    }

    pub fn emotion(&self) -> EmotionState {
        self.emotion
    }

    pub fn anomaly_state(&self) -> AnomalyState {
        self.anomaly
    }

    pub fn is_anomalous(&self) -> bool {
        self.anomaly.is_shifted()
    }

    pub fn last_distance(&self) -> Option<f64> {
        self.last_distance
    }

    pub fn samples_seen(&self) -> u64 {
        self.samples_seen
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

impl Default for BaselineEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::classify::MoodLabel;
    use chrono::Utc;

    const EPS: f64 = 1e-9;

    fn push(history: &mut SessionHistory, valence: f64, energy: f64) {
        history.append(FeatureSample::new(valence, energy, 120.0), "t", Utc::now());
    }

    #[test]
    fn test_empty_history_is_a_noop() {
        let mut engine = BaselineEngine::default();
        assert!(engine.on_new_sample(&SessionHistory::default()).is_none());
        assert_eq!(engine.baseline(), Baseline::default());
        assert_eq!(engine.samples_seen(), 0);
        assert_eq!(engine.emotion(), EmotionState::neutral());
    }

    #[test]
    fn test_single_step_smoothing() {
        let mut engine = BaselineEngine::default();
        let mut history = SessionHistory::default();
        push(&mut history, 0.9, 0.9);

        let update = engine.on_new_sample(&history).unwrap();
        assert!((update.baseline_after.valence - 0.54).abs() < EPS);
        assert!((update.baseline_after.energy - 0.54).abs() < EPS);
        assert_eq!(update.baseline_before, Baseline::default());
    }

    #[test]
    fn test_convergence_closed_form() {
        let mut engine = BaselineEngine::default();
        let mut history = SessionHistory::default();

        for n in 1..=10 {
            push(&mut history, 0.9, 0.9);
            engine.on_new_sample(&history);
            let expected = 0.9 - 0.4 * 0.9f64.powi(n);
            assert!((engine.baseline().valence - expected).abs() < EPS);
            assert!((engine.baseline().energy - expected).abs() < EPS);
        }
        assert!((engine.baseline().valence - 0.760_528_6).abs() < 1e-6);
    }

    #[test]
    fn test_distance_uses_pre_update_baseline() {
        let mut engine = BaselineEngine::default();
        let mut history = SessionHistory::default();
        push(&mut history, 0.9, 0.9);

        let update = engine.on_new_sample(&history).unwrap();
        assert!((update.distance - 0.32f64.sqrt()).abs() < EPS);
        assert!(update.anomalous);
        assert_eq!(update.transition, Some(AnomalyTransition::Raised));
        assert_eq!(update.emotion.label, MoodLabel::HappyExcited);
    }

    #[test]
    fn test_small_deviation_is_stable() {
        let mut engine = BaselineEngine::default();
        let mut history = SessionHistory::default();
        push(&mut history, 0.6, 0.6);

        let update = engine.on_new_sample(&history).unwrap();
        assert!((update.distance - 0.02f64.sqrt()).abs() < EPS);
        assert!(!update.anomalous);
        assert_eq!(update.transition, None);
        assert_eq!(engine.anomaly_state(), AnomalyState::Stable);
    }

    #[test]
    fn test_distance_equal_to_threshold_is_not_anomalous() {
        let config = EngineConfig {
            baseline_learning_rate: 0.1,
            anomaly_threshold: 0.25,
        };
        let mut engine = BaselineEngine::new(config);
        let mut history = SessionHistory::default();
        push(&mut history, 0.75, 0.5);

        let update = engine.on_new_sample(&history).unwrap();
        assert_eq!(update.distance, 0.25);
        assert!(!update.anomalous);
    }

    #[test]
    fn test_flag_chatters_without_hysteresis() {
        let config = EngineConfig {
            baseline_learning_rate: 0.01,
            anomaly_threshold: 0.35,
        };
        let mut engine = BaselineEngine::new(config);
        let mut history = SessionHistory::default();

        let mut flags = Vec::new();
        for i in 0..6 {
            if i % 2 == 0 {
                push(&mut history, 0.9, 0.9);
            } else {
                push(&mut history, 0.5, 0.5);
            }
            flags.push(engine.on_new_sample(&history).unwrap().anomalous);
        }
        assert_eq!(flags, vec![true, false, true, false, true, false]);
    }

    #[test]
    fn test_transition_cleared() {
        let mut engine = BaselineEngine::default();
        let mut history = SessionHistory::default();
        push(&mut history, 0.95, 0.95);
        engine.on_new_sample(&history);
        assert!(engine.is_anomalous());

        push(&mut history, 0.55, 0.55);
        let update = engine.on_new_sample(&history).unwrap();
        assert_eq!(update.transition, Some(AnomalyTransition::Cleared));
        assert!(!engine.is_anomalous());
    }

    #[test]
    fn test_acknowledge_keeps_baseline() {
        let mut engine = BaselineEngine::default();
        let mut history = SessionHistory::default();
        push(&mut history, 0.9, 0.9);
        engine.on_new_sample(&history);
        let baseline = engine.baseline();

        assert!(engine.acknowledge());
        assert!(!engine.is_anomalous());
        assert_eq!(engine.baseline(), baseline);
        assert!(!engine.acknowledge());
    }

    #[test]
    fn test_config_validation() {
        assert!(EngineConfig::default().validate().is_ok());

        let bad_rate = EngineConfig {
            baseline_learning_rate: 0.0,
            ..EngineConfig::default()
        };
        assert_eq!(
            bad_rate.validate(),
            Err(EngineConfigError::LearningRate(0.0))
        );

        let full_rate = EngineConfig {
            baseline_learning_rate: 1.0,
            ..EngineConfig::default()
        };
        assert!(full_rate.validate().is_ok());

        let bad_threshold = EngineConfig {
            anomaly_threshold: f64::NAN,
            ..EngineConfig::default()
        };
        assert!(bad_threshold.validate().is_err());
    }
}
