//! Bounded rolling history of ingested samples.
//!
//! Entries are appended in arrival order and evicted oldest-first once the
//! history is at capacity. Entries are never edited after they are appended.

use crate::core::features::FeatureSample;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Number of entries kept by default.
pub const DEFAULT_HISTORY_CAPACITY: usize = 20;

/// One ingested sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionEntry {
    /// When the sample was ingested
    pub timestamp: DateTime<Utc>,
    /// Display label of the source track
    pub label: String,
    /// The sample itself
    pub features: FeatureSample,
    /// (valence + energy) / 2, frozen at append time
    pub mood_index: f64,
}

impl SessionEntry {
    fn new(timestamp: DateTime<Utc>, label: String, features: FeatureSample) -> Self {
        Self {
            timestamp,
            label,
            mood_index: features.mood_index(),
            features,
        }
    }
}

/// Append/evict-only log of the most recent samples.
#[derive(Debug, Clone)]
pub struct SessionHistory {
    capacity: usize,
    entries: VecDeque<SessionEntry>,
}

impl SessionHistory {
    /// Create a history holding at most `capacity` entries (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    /// Append a sample, evicting the oldest entries beyond capacity.
    ///
    /// Returns the new entry and the number of entries evicted.
    pub fn append(
        &mut self,
        features: FeatureSample,
        label: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> (SessionEntry, usize) {
        let entry = SessionEntry::new(timestamp, label.into(), features);
        self.entries.push_back(entry.clone());

        let mut evicted = 0;
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
            evicted += 1;
        }

        (entry, evicted)
    }

    /// The most recent entry.
    pub fn latest(&self) -> Option<&SessionEntry> {
        self.entries.back()
    }

    /// All entries, oldest first.
    pub fn all(&self) -> Vec<SessionEntry> {
        self.entries.iter().cloned().collect()
    }

    /// Iterate entries, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &SessionEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop every entry (e.g. on disconnect).
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for SessionHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}
