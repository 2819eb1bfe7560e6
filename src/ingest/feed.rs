//! Freshest-only channel between the polling source and the session.
//!
//! Producers push [`PlaybackEvent`]s from any thread. The consumer drains
//! the queue once per tick and only applies the newest event, so a slow or
//! paused consumer never replays stale polls.

use crate::ingest::types::PlaybackEvent;
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Default queue depth.
pub const DEFAULT_FEED_CAPACITY: usize = 64;

/// Errors raised by the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedError {
    AlreadyRunning,
}

impl std::fmt::Display for FeedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeedError::AlreadyRunning => write!(f, "Feed is already running"),
        }
    }
}

impl std::error::Error for FeedError {}

/// Producer side of a [`SampleFeed`].
#[derive(Debug, Clone)]
pub struct FeedHandle {
    sender: Sender<PlaybackEvent>,
    receiver: Receiver<PlaybackEvent>,
}

impl FeedHandle {
    /// Push an event. When the queue is full the oldest queued event is
    /// dropped, since only the newest one will ever be applied.
    pub fn push(&self, event: PlaybackEvent) {
        let mut event = event;
        // The handle keeps a receiver alive, so the channel never disconnects.
        while let Err(TrySendError::Full(back)) = self.sender.try_send(event) {
            let _ = self.receiver.try_recv();
            event = back;
        }
    }
}

/// Consumer side: yields the freshest pending event.
pub struct SampleFeed {
    sender: Sender<PlaybackEvent>,
    receiver: Receiver<PlaybackEvent>,
    running: Arc<AtomicBool>,
}

impl SampleFeed {
    /// Create a stopped feed with the given queue depth.
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity.max(1));
        Self {
            sender,
            receiver,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// A producer handle; may be cloned and moved to other threads.
    pub fn handle(&self) -> FeedHandle {
        FeedHandle {
            sender: self.sender.clone(),
            receiver: self.receiver.clone(),
        }
    }

    /// Start applying events.
    pub fn start(&mut self) -> Result<(), FeedError> {
        if self.running.load(Ordering::SeqCst) {
            return Err(FeedError::AlreadyRunning);
        }
        // Anything queued while stopped is stale.
        self.discard_pending();
        self.running.store(true, Ordering::SeqCst);
        Ok(())
    }

    /// Stop applying events. Pending events are discarded.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        self.discard_pending();
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Drain the queue and return only the newest event.
    ///
    /// Returns `None` when nothing is pending or the feed is stopped.
    pub fn take_latest(&self) -> Option<PlaybackEvent> {
        let latest = self.receiver.try_iter().last();
        if self.is_running() {
            latest
        } else {
            None
        }
    }

    /// Number of events waiting.
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }

    fn discard_pending(&self) -> usize {
        self.receiver.try_iter().count()
    }
}

impl Default for SampleFeed {
    fn default() -> Self {
        Self::new(DEFAULT_FEED_CAPACITY)
    }
}
