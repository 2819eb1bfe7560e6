//! moodtrack - mood tracking from music listening.
//!
//! Each track's audio features (valence, energy) are classified into a mood,
//! folded into an exponentially-weighted personal baseline, and compared
//! against that baseline to detect mood shifts worth journaling about.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          moodtrack                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐        │
//! │  │  Playback   │──▶│    Feed     │──▶│   Tracker   │        │
//! │  │   source    │   │ (freshest)  │   │  (dedupe)   │        │
//! │  └─────────────┘   └─────────────┘   └─────────────┘        │
//! │                                             │               │
//! │                                             ▼               │
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐        │
//! │  │  Snapshot   │◀──│  Baseline   │◀──│   History   │        │
//! │  │   export    │   │   engine    │   │  (last 20)  │        │
//! │  └─────────────┘   └─────────────┘   └─────────────┘        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use moodtrack::core::{EngineConfig, FeatureSample, MoodLabel};
//! use moodtrack::MoodSession;
//!
//! let mut session = MoodSession::new(EngineConfig::default(), 20);
//! let outcome = session.submit_sample(FeatureSample::new(0.9, 0.9, 140.0), "Workout");
//!
//! assert_eq!(outcome.update.emotion.label, MoodLabel::HappyExcited);
//! assert!(session.is_anomalous());
//! ```

pub mod agent;
pub mod clock;
pub mod config;
pub mod core;
pub mod ingest;
pub mod session;
pub mod snapshot;
pub mod transparency;

// Re-export key types at crate root for convenience
pub use agent::MoodAgent;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{Config, ConfigError};
pub use core::{
    classify, AnomalyState, Baseline, BaselineEngine, EmotionState, EngineConfig, FeatureSample,
    MoodLabel, SessionEntry, SessionHistory,
};
pub use ingest::{PlaybackEvent, SampleFeed, TrackObservation, TrackTracker};
pub use session::{JournalTrigger, MoodSession, SampleOutcome};
pub use snapshot::{MoodSnapshot, SnapshotBuilder};
pub use transparency::{SessionLog, SessionStats, SharedSessionLog};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Privacy declaration that can be displayed to users.
pub const PRIVACY_DECLARATION: &str = r#"
╔══════════════════════════════════════════════════════════════════╗
║                 MOODTRACK - PRIVACY DECLARATION                  ║
╠══════════════════════════════════════════════════════════════════╣
║                                                                  ║
║  moodtrack estimates your mood from the music you listen to.     ║
║                                                                  ║
║  ✓ WHAT WE USE:                                                  ║
║    • The track currently playing (name and artists)              ║
║    • Its audio features (valence, energy, tempo)                 ║
║                                                                  ║
║  ✗ WHAT WE NEVER DO:                                             ║
║    • Send your listening history anywhere                        ║
║    • Keep listening history after the session ends               ║
║    • Write track names to disk, except in exports you request    ║
║                                                                  ║
║  All processing happens on this machine.                         ║
║                                                                  ║
║  You can view processing statistics anytime with:                ║
║    moodtrack status                                              ║
║                                                                  ║
╚══════════════════════════════════════════════════════════════════╝
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_privacy_declaration_contents() {
        assert!(PRIVACY_DECLARATION.contains("PRIVACY"));
        assert!(PRIVACY_DECLARATION.contains("NEVER DO"));
        assert!(PRIVACY_DECLARATION.contains("audio features"));
    }
}
