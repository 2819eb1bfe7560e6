//! Core mood pipeline.
//!
//! This module contains:
//! - Feature samples and their sanitization
//! - Mood classification
//! - The bounded session history
//! - Baseline tracking and mood-shift detection

pub mod baseline;
pub mod classify;
pub mod features;
pub mod history;

// Re-export commonly used types
pub use baseline::{
    AnomalyState, AnomalyTransition, Baseline, BaselineEngine, EngineConfig, EngineConfigError,
    EngineUpdate,
};
pub use classify::{classify, classify_opt, EmotionState, MoodLabel};
pub use features::{FeatureSample, PendingFeatures, RawFeatures};
pub use history::{SessionEntry, SessionHistory, DEFAULT_HISTORY_CAPACITY};
