//! Playback observations delivered by the polling collaborator.
//!
//! Each poll of the playback API yields one [`PlaybackEvent`]. The core only
//! cares about the track identity, a display label and the feature state.

use crate::core::PendingFeatures;
use serde::{Deserialize, Serialize};

/// What kind of item is playing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    #[default]
    Track,
    /// Podcast episode
    Episode,
    Ad,
    Unknown,
}

/// The currently playing item as seen by one poll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackObservation {
    /// Provider track id, used to recognize repeated polls of the same track
    pub track_id: String,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<String>,
    #[serde(default)]
    pub kind: ItemKind,
    #[serde(default)]
    pub features: PendingFeatures,
}

impl TrackObservation {
    /// Create an observation of a music track.
    pub fn track(
        track_id: impl Into<String>,
        name: impl Into<String>,
        features: PendingFeatures,
    ) -> Self {
        Self {
            track_id: track_id.into(),
            name: name.into(),
            artists: Vec::new(),
            kind: ItemKind::Track,
            features,
        }
    }

    pub fn with_artists(mut self, artists: Vec<String>) -> Self {
        self.artists = artists;
        self
    }

    pub fn with_kind(mut self, kind: ItemKind) -> Self {
        self.kind = kind;
        self
    }

    /// Label stored in the history: "name - artist, artist" or just the name.
    pub fn display_label(&self) -> String {
        if self.artists.is_empty() {
            self.name.clone()
        } else {
            format!("{} - {}", self.name, self.artists.join(", "))
        }
    }
}

/// Result of one poll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PlaybackEvent {
    /// Something is playing
    Observation(TrackObservation),
    /// Nothing playing, or the poll returned no content
    NothingPlaying,
    /// Credentials expired or the user logged out
    Disconnected,
}
