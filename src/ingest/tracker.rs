//! Decides which playback observations become samples.
//!
//! The playback API is polled every few seconds and keeps reporting the same
//! track for its whole duration. With suppression enabled a track is
//! submitted once when first seen with features, and once more if its
//! placeholder features are later replaced by resolved ones.

use crate::core::{FeatureSample, PendingFeatures};
use crate::ingest::types::{ItemKind, TrackObservation};

/// Why an observation produced no sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Podcast, ad or unknown item
    NotATrack,
    /// Track seen but its features are not known yet
    FeaturesUnknown,
}

/// What to do with an observation.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// Submit this sample with this label
    Submit(FeatureSample, String),
    /// Same track and nothing new
    Suppressed,
    Skipped(SkipReason),
}

#[derive(Debug, Clone)]
struct SeenTrack {
    track_id: String,
    submitted: PendingFeatures,
}

/// Tracks the current item to suppress repeated polls.
#[derive(Debug, Clone)]
pub struct TrackTracker {
    suppress_duplicates: bool,
    current: Option<SeenTrack>,
}

impl TrackTracker {
    pub fn new(suppress_duplicates: bool) -> Self {
        Self {
            suppress_duplicates,
            current: None,
        }
    }

    /// Classify one observation.
    pub fn observe(&mut self, observation: &TrackObservation) -> Decision {
        if observation.kind != ItemKind::Track {
            return Decision::Skipped(SkipReason::NotATrack);
        }

        let is_new_track = self
            .current
            .as_ref()
            .map_or(true, |seen| seen.track_id != observation.track_id);

        let Some(sample) = observation.features.sample() else {
            if is_new_track {
                self.current = Some(SeenTrack {
                    track_id: observation.track_id.clone(),
                    submitted: PendingFeatures::Unknown,
                });
            }
            return Decision::Skipped(SkipReason::FeaturesUnknown);
        };

        let submit = !self.suppress_duplicates
            || is_new_track
            || self.upgrades_current(&observation.features);

        if !submit {
            return Decision::Suppressed;
        }

        self.current = Some(SeenTrack {
            track_id: observation.track_id.clone(),
            submitted: observation.features,
        });

        // Sanitize at the boundary: replayed or hand-written payloads may be out of range.
        let sample = FeatureSample::new(sample.valence, sample.energy, sample.tempo);
        Decision::Submit(sample, observation.display_label())
    }

    /// True if the current track has not been submitted with resolved
    /// features and the new state is resolved, or if it was never submitted.
    fn upgrades_current(&self, features: &PendingFeatures) -> bool {
        match self.current.as_ref().map(|seen| &seen.submitted) {
            Some(PendingFeatures::Unknown) | None => true,
            Some(PendingFeatures::Placeholder(_)) => features.is_resolved(),
            Some(PendingFeatures::Resolved(_)) => false,
        }
    }

    /// Forget the current track (e.g. on disconnect).
    pub fn reset(&mut self) {
        self.current = None;
    }

    pub fn current_track_id(&self) -> Option<&str> {
        self.current.as_ref().map(|seen| seen.track_id.as_str())
    }
}

impl Default for TrackTracker {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RawFeatures;

    fn resolved(valence: f64, energy: f64) -> PendingFeatures {
        PendingFeatures::Resolved(FeatureSample::new(valence, energy, 120.0))
    }

    fn obs(id: &str, features: PendingFeatures) -> TrackObservation {
        TrackObservation::track(id, format!("track {id}"), features)
    }

    #[test]
    fn test_repeated_polls_are_suppressed() {
        let mut tracker = TrackTracker::default();
        let first = tracker.observe(&obs("a", resolved(0.9, 0.9)));
        assert!(matches!(first, Decision::Submit(_, ref label) if label == "track a"));

        assert_eq!(tracker.observe(&obs("a", resolved(0.9, 0.9))), Decision::Suppressed);
        assert_eq!(tracker.observe(&obs("a", resolved(0.9, 0.9))), Decision::Suppressed);
        assert_eq!(tracker.current_track_id(), Some("a"));
    }

    #[test]
    fn test_new_track_is_submitted() {
        let mut tracker = TrackTracker::default();
        tracker.observe(&obs("a", resolved(0.9, 0.9)));
        assert!(matches!(
            tracker.observe(&obs("b", resolved(0.1, 0.1))),
            Decision::Submit(s, _) if s.valence == 0.1
        ));
    }

    #[test]
    fn test_placeholder_then_resolved() {
        let mut tracker = TrackTracker::default();

        let first = tracker.observe(&obs("a", PendingFeatures::placeholder()));
        assert_eq!(
            first,
            Decision::Submit(FeatureSample::placeholder(), "track a".to_string())
        );
        assert_eq!(
            tracker.observe(&obs("a", PendingFeatures::placeholder())),
            Decision::Suppressed
        );

        let upgraded = tracker.observe(&obs("a", resolved(0.2, 0.3)));
        assert!(matches!(upgraded, Decision::Submit(s, _) if s.energy == 0.3));

        assert_eq!(tracker.observe(&obs("a", resolved(0.2, 0.3))), Decision::Suppressed);
    }

    #[test]
    fn test_resolved_neutral_features_are_not_mistaken_for_placeholder() {
        let mut tracker = TrackTracker::default();
        let neutral = PendingFeatures::resolved(RawFeatures {
            valence: Some(0.5),
            energy: Some(0.5),
            tempo: Some(120.0),
        });
        assert!(matches!(tracker.observe(&obs("a", neutral)), Decision::Submit(..)));
        assert_eq!(tracker.observe(&obs("a", resolved(0.9, 0.9))), Decision::Suppressed);
    }

    #[test]
    fn test_unknown_features_wait_for_resolution() {
        let mut tracker = TrackTracker::default();
        assert_eq!(
            tracker.observe(&obs("a", PendingFeatures::Unknown)),
            Decision::Skipped(SkipReason::FeaturesUnknown)
        );
        assert!(matches!(
            tracker.observe(&obs("a", resolved(0.7, 0.7))),
            Decision::Submit(..)
        ));
    }

    #[test]
    fn test_non_tracks_are_skipped() {
        let mut tracker = TrackTracker::default();
        let episode = obs("p", resolved(0.5, 0.5)).with_kind(ItemKind::Episode);
        assert_eq!(
            tracker.observe(&episode),
            Decision::Skipped(SkipReason::NotATrack)
        );
        assert_eq!(tracker.current_track_id(), None);
    }

    #[test]
    fn test_without_suppression_every_poll_submits() {
        let mut tracker = TrackTracker::new(false);
        for _ in 0..3 {
            assert!(matches!(
                tracker.observe(&obs("a", resolved(0.9, 0.9))),
                Decision::Submit(..)
            ));
        }
    }

    #[test]
    fn test_reset_resubmits_current_track() {
        let mut tracker = TrackTracker::default();
        tracker.observe(&obs("a", resolved(0.9, 0.9)));
        tracker.reset();
        assert!(matches!(
            tracker.observe(&obs("a", resolved(0.9, 0.9))),
            Decision::Submit(..)
        ));
    }

    #[test]
    fn test_out_of_range_payload_is_clamped() {
        let mut tracker = TrackTracker::default();
        let wild = PendingFeatures::Resolved(FeatureSample {
            valence: 1.4,
            energy: -1.0,
            tempo: 90.0,
        });
        match tracker.observe(&obs("a", wild)) {
            Decision::Submit(sample, _) => {
                assert_eq!(sample.valence, 1.0);
                assert_eq!(sample.energy, 0.0);
            }
            other => panic!("unexpected decision: {other:?}"),
        }
    }
}
