//! Session statistics log.
//!
//! Counts what the agent did with the listening data it received, without
//! keeping any track names or feature values.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::warn;

/// Counters for the current session.
#[derive(Debug)]
pub struct SessionLog {
    /// Playback polls received
    observations_received: AtomicU64,
    /// Samples submitted to the session
    samples_submitted: AtomicU64,
    /// Polls dropped as repeats of the current track
    duplicates_suppressed: AtomicU64,
    /// Stable to shifted transitions
    anomalies_raised: AtomicU64,
    /// History entries evicted at capacity
    entries_evicted: AtomicU64,
    /// Mood snapshots written to disk
    snapshots_exported: AtomicU64,
    session_start: DateTime<Utc>,
    persist_path: Option<PathBuf>,
}

impl SessionLog {
    pub fn new() -> Self {
        Self {
            observations_received: AtomicU64::new(0),
            samples_submitted: AtomicU64::new(0),
            duplicates_suppressed: AtomicU64::new(0),
            anomalies_raised: AtomicU64::new(0),
            entries_evicted: AtomicU64::new(0),
            snapshots_exported: AtomicU64::new(0),
            session_start: Utc::now(),
            persist_path: None,
        }
    }

    /// Create a log that continues from, and saves to, `path`.
    pub fn with_persistence(path: PathBuf) -> Self {
        let mut log = Self::new();
        log.persist_path = Some(path);

        if let Err(e) = log.load() {
            warn!("could not load previous session stats: {e}");
        }

        log
    }

    pub fn record_observation(&self) {
        self.observations_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_sample_submitted(&self) {
        self.samples_submitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_duplicate_suppressed(&self) {
        self.duplicates_suppressed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_anomaly_raised(&self) {
        self.anomalies_raised.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_entries_evicted(&self, count: u64) {
        self.entries_evicted.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_snapshot_exported(&self) {
        self.snapshots_exported.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the current statistics.
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            observations_received: self.observations_received.load(Ordering::Relaxed),
            samples_submitted: self.samples_submitted.load(Ordering::Relaxed),
            duplicates_suppressed: self.duplicates_suppressed.load(Ordering::Relaxed),
            anomalies_raised: self.anomalies_raised.load(Ordering::Relaxed),
            entries_evicted: self.entries_evicted.load(Ordering::Relaxed),
            snapshots_exported: self.snapshots_exported.load(Ordering::Relaxed),
            session_start: self.session_start,
            session_duration_secs: (Utc::now() - self.session_start).num_seconds().max(0) as u64,
        }
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        let stats = self.stats();
        format!(
            "Session Statistics:\n\
             - Playback polls received: {}\n\
             - Samples submitted: {}\n\
             - Repeated polls suppressed: {}\n\
             - Mood shifts detected: {}\n\
             - History entries evicted: {}\n\
             - Snapshots exported: {}\n\
             - Session duration: {} seconds\n\
             \n\
             Privacy:\n\
             - All processing happened on this machine\n\
             - Only counters are persisted, never track names or features",
            stats.observations_received,
            stats.samples_submitted,
            stats.duplicates_suppressed,
            stats.anomalies_raised,
            stats.entries_evicted,
            stats.snapshots_exported,
            stats.session_duration_secs
        )
    }

    /// Save stats to disk.
    pub fn save(&self) -> Result<(), std::io::Error> {
        if let Some(ref path) = self.persist_path {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let stats = self.stats();
            let persisted = PersistedStats {
                observations_received: stats.observations_received,
                samples_submitted: stats.samples_submitted,
                duplicates_suppressed: stats.duplicates_suppressed,
                anomalies_raised: stats.anomalies_raised,
                entries_evicted: stats.entries_evicted,
                snapshots_exported: stats.snapshots_exported,
                last_updated: Utc::now(),
            };

            let json = serde_json::to_string_pretty(&persisted).map_err(std::io::Error::other)?;

            std::fs::write(path, json)?;
        }
        Ok(())
    }

    fn load(&mut self) -> Result<(), std::io::Error> {
        if let Some(ref path) = self.persist_path {
            if path.exists() {
                let content = std::fs::read_to_string(path)?;
                let persisted: PersistedStats =
                    serde_json::from_str(&content).map_err(std::io::Error::other)?;

                self.observations_received
                    .store(persisted.observations_received, Ordering::Relaxed);
                self.samples_submitted
                    .store(persisted.samples_submitted, Ordering::Relaxed);
                self.duplicates_suppressed
                    .store(persisted.duplicates_suppressed, Ordering::Relaxed);
                self.anomalies_raised
                    .store(persisted.anomalies_raised, Ordering::Relaxed);
                self.entries_evicted
                    .store(persisted.entries_evicted, Ordering::Relaxed);
                self.snapshots_exported
                    .store(persisted.snapshots_exported, Ordering::Relaxed);
            }
        }
        Ok(())
    }

    /// Reset all counters.
    pub fn reset(&self) {
        self.observations_received.store(0, Ordering::Relaxed);
        self.samples_submitted.store(0, Ordering::Relaxed);
        self.duplicates_suppressed.store(0, Ordering::Relaxed);
        self.anomalies_raised.store(0, Ordering::Relaxed);
        self.entries_evicted.store(0, Ordering::Relaxed);
        self.snapshots_exported.store(0, Ordering::Relaxed);
    }
}

impl Default for SessionLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of session statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStats {
    pub observations_received: u64,
    pub samples_submitted: u64,
    pub duplicates_suppressed: u64,
    pub anomalies_raised: u64,
    pub entries_evicted: u64,
    pub snapshots_exported: u64,
    pub session_start: DateTime<Utc>,
    pub session_duration_secs: u64,
}

/// Stats format for persistence.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedStats {
    observations_received: u64,
    samples_submitted: u64,
    duplicates_suppressed: u64,
    anomalies_raised: u64,
    entries_evicted: u64,
    snapshots_exported: u64,
    last_updated: DateTime<Utc>,
}

/// Thread-safe shared session log.
pub type SharedSessionLog = Arc<SessionLog>;

/// Create a new shared session log.
pub fn create_shared_log() -> SharedSessionLog {
    Arc::new(SessionLog::new())
}

/// Create a new shared session log with persistence.
pub fn create_shared_log_with_persistence(path: PathBuf) -> SharedSessionLog {
    Arc::new(SessionLog::with_persistence(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_log_counting() {
        let log = SessionLog::new();

        log.record_observation();
        log.record_observation();
        log.record_sample_submitted();
        log.record_duplicate_suppressed();
        log.record_entries_evicted(3);

        let stats = log.stats();
        assert_eq!(stats.observations_received, 2);
        assert_eq!(stats.samples_submitted, 1);
        assert_eq!(stats.duplicates_suppressed, 1);
        assert_eq!(stats.entries_evicted, 3);
    }

    #[test]
    fn test_session_log_reset() {
        let log = SessionLog::new();

        log.record_anomaly_raised();
        log.record_snapshot_exported();
        log.reset();

        let stats = log.stats();
        assert_eq!(stats.anomalies_raised, 0);
        assert_eq!(stats.snapshots_exported, 0);
    }

    #[test]
    fn test_summary_format() {
        let log = SessionLog::new();
        let summary = log.summary();

        assert!(summary.contains("Samples submitted"));
        assert!(summary.contains("Mood shifts detected"));
        assert!(summary.contains("never track names"));
    }

    #[test]
    fn test_persistence_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats").join("session_stats.json");

        let log = SessionLog::with_persistence(path.clone());
        log.record_sample_submitted();
        log.record_anomaly_raised();
        log.save().unwrap();

        let reloaded = SessionLog::with_persistence(path);
        let stats = reloaded.stats();
        assert_eq!(stats.samples_submitted, 1);
        assert_eq!(stats.anomalies_raised, 1);
    }
}
