//! Ingestion boundary between the playback source and a session.
//!
//! This module turns raw poll results into samples:
//! - [`types`]: what one poll reports
//! - [`tracker`]: which polls are new samples
//! - [`feed`]: freshest-only hand-off across threads
//! - [`replay`]: recorded polls from JSON Lines

pub mod feed;
pub mod replay;
pub mod tracker;
pub mod types;

// Re-export commonly used types
pub use feed::{FeedError, FeedHandle, SampleFeed, DEFAULT_FEED_CAPACITY};
pub use replay::{ReplayError, ReplaySource};
pub use tracker::{Decision, SkipReason, TrackTracker};
pub use types::{ItemKind, PlaybackEvent, TrackObservation};
