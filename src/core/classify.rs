//! Mood classification from valence and energy.
//!
//! A coarse quantization of the valence/energy square into five buckets.
//! Comparisons are strict on both sides: 0.4 and 0.6 never satisfy a rule
//! on that axis, so the bands `[0.4, 0.6]` always fall through to Neutral.

use crate::core::features::FeatureSample;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Upper edge of the "low" band (exclusive).
pub const LOW_THRESHOLD: f64 = 0.4;

/// Lower edge of the "high" band (exclusive).
pub const HIGH_THRESHOLD: f64 = 0.6;

/// Closed set of mood categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoodLabel {
    #[serde(rename = "Happy/Excited")]
    HappyExcited,
    #[serde(rename = "Sad/Melancholic")]
    SadMelancholic,
    #[serde(rename = "Anxious/Tense")]
    AnxiousTense,
    #[serde(rename = "Calm/Relaxed")]
    CalmRelaxed,
    #[serde(rename = "Neutral")]
    Neutral,
}

impl MoodLabel {
    /// Display name of the mood.
    pub fn as_str(self) -> &'static str {
        match self {
            MoodLabel::HappyExcited => "Happy/Excited",
            MoodLabel::SadMelancholic => "Sad/Melancholic",
            MoodLabel::AnxiousTense => "Anxious/Tense",
            MoodLabel::CalmRelaxed => "Calm/Relaxed",
            MoodLabel::Neutral => "Neutral",
        }
    }

    /// Representative score for the label.
    pub fn score(self) -> f64 {
        match self {
            MoodLabel::HappyExcited => 0.9,
            MoodLabel::SadMelancholic => 0.2,
            MoodLabel::AnxiousTense => 0.3,
            MoodLabel::CalmRelaxed => 0.8,
            MoodLabel::Neutral => 0.5,
        }
    }

    /// Positive-valence moods.
    pub fn is_positive(self) -> bool {
        matches!(self, MoodLabel::HappyExcited | MoodLabel::CalmRelaxed)
    }

    /// Negative-valence moods.
    pub fn is_negative(self) -> bool {
        matches!(self, MoodLabel::SadMelancholic | MoodLabel::AnxiousTense)
    }
}

impl fmt::Display for MoodLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classified mood of the latest sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmotionState {
    pub label: MoodLabel,
    /// Fixed per label, see [`MoodLabel::score`]
    pub score: f64,
}

impl EmotionState {
    pub fn from_label(label: MoodLabel) -> Self {
        Self {
            label,
            score: label.score(),
        }
    }

    /// State reported before any sample has been seen.
    pub fn neutral() -> Self {
        Self::from_label(MoodLabel::Neutral)
    }
}

impl Default for EmotionState {
    fn default() -> Self {
        Self::neutral()
    }
}

/// Classify a sample. First matching rule wins.
pub fn classify(features: &FeatureSample) -> EmotionState {
    let high_valence = features.valence > HIGH_THRESHOLD;
    let low_valence = features.valence < LOW_THRESHOLD;
    let high_energy = features.energy > HIGH_THRESHOLD;
    let low_energy = features.energy < LOW_THRESHOLD;

    let label = if high_valence && high_energy {
        MoodLabel::HappyExcited
    } else if low_valence && low_energy {
        MoodLabel::SadMelancholic
    } else if low_valence && high_energy {
        MoodLabel::AnxiousTense
    } else if high_valence && low_energy {
        MoodLabel::CalmRelaxed
    } else {
        MoodLabel::Neutral
    };

    EmotionState::from_label(label)
}

/// Classify an optional sample; absent input is Neutral.
pub fn classify_opt(features: Option<&FeatureSample>) -> EmotionState {
    features.map(classify).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(valence: f64, energy: f64) -> FeatureSample {
        FeatureSample::new(valence, energy, 120.0)
    }

    #[test]
    fn test_quadrants() {
        assert_eq!(classify(&sample(0.9, 0.8)).label, MoodLabel::HappyExcited);
        assert_eq!(classify(&sample(0.1, 0.2)).label, MoodLabel::SadMelancholic);
        assert_eq!(classify(&sample(0.3, 0.8)).label, MoodLabel::AnxiousTense);
        assert_eq!(classify(&sample(0.8, 0.3)).label, MoodLabel::CalmRelaxed);
    }

    #[test]
    fn test_boundaries_are_exclusive() {
        assert_eq!(classify(&sample(0.6, 0.6)).label, MoodLabel::Neutral);
        assert_eq!(classify(&sample(0.61, 0.61)).label, MoodLabel::HappyExcited);
        assert_eq!(classify(&sample(0.4, 0.4)).label, MoodLabel::Neutral);
        assert_eq!(classify(&sample(0.39, 0.39)).label, MoodLabel::SadMelancholic);
        assert_eq!(classify(&sample(0.5, 0.5)).label, MoodLabel::Neutral);
        assert_eq!(classify(&sample(0.39, 0.6)).label, MoodLabel::Neutral);
        assert_eq!(classify(&sample(0.6, 0.39)).label, MoodLabel::Neutral);
    }

    #[test]
    fn test_uncovered_combinations_fall_through() {
        assert_eq!(classify(&sample(0.5, 0.9)).label, MoodLabel::Neutral);
        assert_eq!(classify(&sample(0.9, 0.5)).label, MoodLabel::Neutral);
        assert_eq!(classify(&sample(0.1, 0.5)).label, MoodLabel::Neutral);
    }

    #[test]
    fn test_scores_follow_labels() {
        assert_eq!(classify(&sample(0.9, 0.9)).score, 0.9);
        assert_eq!(classify(&sample(0.1, 0.1)).score, 0.2);
        assert_eq!(classify(&sample(0.1, 0.9)).score, 0.3);
        assert_eq!(classify(&sample(0.9, 0.1)).score, 0.8);
        assert_eq!(classify(&sample(0.5, 0.5)).score, 0.5);
    }

    #[test]
    fn test_absent_input_is_neutral() {
        assert_eq!(classify_opt(None), EmotionState::neutral());
        assert_eq!(
            classify_opt(Some(&sample(0.9, 0.9))).label,
            MoodLabel::HappyExcited
        );
    }

    #[test]
    fn test_classify_is_pure() {
        let s = sample(0.3, 0.7);
        assert_eq!(classify(&s), classify(&s));
    }

    #[test]
    fn test_label_serializes_as_display_name() {
        let json = serde_json::to_string(&MoodLabel::SadMelancholic).unwrap();
        assert_eq!(json, "\"Sad/Melancholic\"");
        assert_eq!(MoodLabel::CalmRelaxed.to_string(), "Calm/Relaxed");
        assert!(MoodLabel::CalmRelaxed.is_positive());
        assert!(MoodLabel::AnxiousTense.is_negative());
        assert!(!MoodLabel::Neutral.is_positive() && !MoodLabel::Neutral.is_negative());
    }
}
