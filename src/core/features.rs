//! Audio-feature samples and their sanitization.
//!
//! The core only ever sees a [`FeatureSample`] whose valence and energy are
//! defined and inside `[0, 1]`. Upstream payloads arrive as [`RawFeatures`]
//! and are repaired here, at the ingestion boundary.

use serde::{Deserialize, Serialize};

/// Neutral midpoint used when valence or energy is missing upstream.
pub const NEUTRAL_FEATURE_VALUE: f64 = 0.5;

/// Tempo assumed when the upstream payload has none.
pub const DEFAULT_TEMPO_BPM: f64 = 100.0;

/// Tempo carried by the placeholder sample while features are outstanding.
pub const PLACEHOLDER_TEMPO_BPM: f64 = 120.0;

/// One observation of a track's acoustic character.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureSample {
    /// Musical positivity (0-1)
    pub valence: f64,
    /// Intensity / arousal (0-1)
    pub energy: f64,
    /// Beats per minute (descriptive only)
    pub tempo: f64,
}

impl FeatureSample {
    /// Create a sample, clamping valence and energy into `[0, 1]`.
    pub fn new(valence: f64, energy: f64, tempo: f64) -> Self {
        RawFeatures {
            valence: Some(valence),
            energy: Some(energy),
            tempo: Some(tempo),
        }
        .sanitize()
    }

    /// The neutral stand-in used while a track's features are unknown.
    pub fn placeholder() -> Self {
        Self {
            valence: NEUTRAL_FEATURE_VALUE,
            energy: NEUTRAL_FEATURE_VALUE,
            tempo: PLACEHOLDER_TEMPO_BPM,
        }
    }

    /// Mood index used for trend charting: the mean of valence and energy.
    pub fn mood_index(&self) -> f64 {
        (self.valence + self.energy) / 2.0
    }
}

/// Audio features as delivered by the playback API, any field may be absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFeatures {
    #[serde(default)]
    pub valence: Option<f64>,
    #[serde(default)]
    pub energy: Option<f64>,
    #[serde(default)]
    pub tempo: Option<f64>,
}

impl RawFeatures {
    /// Turn the payload into a well-formed sample.
    ///
    /// Missing or non-finite valence/energy become 0.5 and out-of-range
    /// values are clamped. Tempo falls back to [`DEFAULT_TEMPO_BPM`].
    ///
    /// A reported 0.0 valence or energy is a real reading and is kept, unlike
    /// tempo where 0 means the provider had no estimate.
    pub fn sanitize(&self) -> FeatureSample {
        FeatureSample {
            valence: unit_or_neutral(self.valence),
            energy: unit_or_neutral(self.energy),
            tempo: match self.tempo {
                Some(t) if t.is_finite() && t > 0.0 => t,
                _ => DEFAULT_TEMPO_BPM,
            },
        }
    }
}

fn unit_or_neutral(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() => v.clamp(0.0, 1.0),
        _ => NEUTRAL_FEATURE_VALUE,
    }
}

/// Resolution state of a track's features.
///
/// Replaces guessing from sentinel 0.5/0.5 values: the source says
/// explicitly whether the sample is real or a stand-in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "features", rename_all = "snake_case")]
pub enum PendingFeatures {
    /// Nothing known yet
    #[default]
    Unknown,
    /// Neutral stand-in while the fetch is outstanding or after it failed
    Placeholder(FeatureSample),
    /// Real features from the audio-feature endpoint
    Resolved(FeatureSample),
}

impl PendingFeatures {
    /// Placeholder state carrying the standard neutral sample.
    pub fn placeholder() -> Self {
        PendingFeatures::Placeholder(FeatureSample::placeholder())
    }

    /// Resolved state from an upstream payload.
    pub fn resolved(raw: RawFeatures) -> Self {
        PendingFeatures::Resolved(raw.sanitize())
    }

    /// The sample, if any.
    pub fn sample(&self) -> Option<FeatureSample> {
        match self {
            PendingFeatures::Unknown => None,
            PendingFeatures::Placeholder(s) | PendingFeatures::Resolved(s) => Some(*s),
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, PendingFeatures::Resolved(_))
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, PendingFeatures::Placeholder(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_values_default_to_neutral() {
        let sample = RawFeatures::default().sanitize();
        assert_eq!(sample.valence, 0.5);
        assert_eq!(sample.energy, 0.5);
        assert_eq!(sample.tempo, DEFAULT_TEMPO_BPM);
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let raw = RawFeatures {
            valence: Some(1.7),
            energy: Some(-0.2),
            tempo: Some(128.0),
        };
        let sample = raw.sanitize();
        assert_eq!(sample.valence, 1.0);
        assert_eq!(sample.energy, 0.0);
        assert_eq!(sample.tempo, 128.0);
    }

    #[test]
    fn test_zero_is_a_real_value() {
        let raw = RawFeatures {
            valence: Some(0.0),
            energy: Some(0.0),
            tempo: Some(0.0),
        };
        let sample = raw.sanitize();
        assert_eq!(sample.valence, 0.0);
        assert_eq!(sample.energy, 0.0);
        assert_eq!(sample.tempo, DEFAULT_TEMPO_BPM);
    }

    #[test]
    fn test_non_finite_values_default_to_neutral() {
        let raw = RawFeatures {
            valence: Some(f64::NAN),
            energy: Some(f64::INFINITY),
            tempo: None,
        };
        let sample = raw.sanitize();
        assert_eq!(sample.valence, 0.5);
        assert_eq!(sample.energy, 0.5);
    }

    #[test]
    fn test_mood_index() {
        let sample = FeatureSample::new(0.2, 0.8, 90.0);
        assert!((sample.mood_index() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_pending_features_states() {
        assert_eq!(PendingFeatures::Unknown.sample(), None);

        let placeholder = PendingFeatures::placeholder();
        assert!(placeholder.is_placeholder());
        assert_eq!(placeholder.sample(), Some(FeatureSample::placeholder()));

        let resolved = PendingFeatures::resolved(RawFeatures {
            valence: Some(0.9),
            energy: Some(0.8),
            tempo: Some(120.0),
        });
        assert!(resolved.is_resolved());
        assert_eq!(resolved.sample().map(|s| s.valence), Some(0.9));
    }

    #[test]
    fn test_pending_features_json_shape() {
        let json = serde_json::to_string(&PendingFeatures::Unknown).unwrap();
        assert_eq!(json, r#"{"state":"unknown"}"#);

        let parsed: PendingFeatures = serde_json::from_str(
            r#"{"state":"resolved","features":{"valence":0.1,"energy":0.2,"tempo":60.0}}"#,
        )
        .unwrap();
        assert_eq!(parsed, PendingFeatures::Resolved(FeatureSample::new(0.1, 0.2, 60.0)));
    }
}
