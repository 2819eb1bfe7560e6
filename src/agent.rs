//! Glue between playback events and a mood session.
//!
//! One [`PlaybackEvent`] in, at most one sample submitted. Counters go to the
//! shared [`SessionLog`](crate::transparency::SessionLog).

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::core::AnomalyTransition;
use crate::ingest::{Decision, PlaybackEvent, SkipReason, TrackTracker};
use crate::session::{MoodSession, SampleOutcome};
use crate::transparency::{create_shared_log, SharedSessionLog};
use tracing::{debug, info};

/// A session plus the ingestion state that feeds it.
pub struct MoodAgent<C: Clock = SystemClock> {
    session: MoodSession<C>,
    tracker: TrackTracker,
    log: SharedSessionLog,
}

impl MoodAgent<SystemClock> {
    /// Create an agent from the application configuration.
    pub fn from_config(config: &Config, log: SharedSessionLog) -> Self {
        Self::new(
            MoodSession::from_config(config),
            TrackTracker::new(config.suppress_duplicates),
            log,
        )
    }
}

impl<C: Clock> MoodAgent<C> {
    pub fn new(session: MoodSession<C>, tracker: TrackTracker, log: SharedSessionLog) -> Self {
        Self {
            session,
            tracker,
            log,
        }
    }

    /// Agent with default duplicate suppression and a private log.
    pub fn with_session(session: MoodSession<C>) -> Self {
        Self::new(session, TrackTracker::default(), create_shared_log())
    }

    /// Apply one poll result.
    ///
    /// Returns the outcome if the event produced a new sample.
    pub fn handle_event(&mut self, event: PlaybackEvent) -> Option<SampleOutcome> {
        match event {
            PlaybackEvent::Observation(observation) => {
                self.log.record_observation();
                match self.tracker.observe(&observation) {
                    Decision::Submit(sample, label) => {
                        let outcome = self.session.submit_sample(sample, label);
                        self.log.record_sample_submitted();
                        self.log.record_entries_evicted(outcome.evicted as u64);
                        if outcome.update.transition == Some(AnomalyTransition::Raised) {
                            self.log.record_anomaly_raised();
                        }
                        Some(outcome)
                    }
                    Decision::Suppressed => {
                        self.log.record_duplicate_suppressed();
                        None
                    }
                    Decision::Skipped(SkipReason::NotATrack) => {
                        debug!(track_id = %observation.track_id, "not a music track, skipping");
                        None
                    }
                    Decision::Skipped(SkipReason::FeaturesUnknown) => {
                        debug!(track_id = %observation.track_id, "features not known yet");
                        None
                    }
                }
            }
            PlaybackEvent::NothingPlaying => None,
            PlaybackEvent::Disconnected => {
                info!("playback source disconnected, clearing history");
                self.tracker.reset();
                self.session.clear_history();
                None
            }
        }
    }

    pub fn session(&self) -> &MoodSession<C> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut MoodSession<C> {
        &mut self.session
    }

    pub fn log(&self) -> &SharedSessionLog {
        &self.log
    }
}
