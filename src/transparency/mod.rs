//! Transparency module for moodtrack.
//!
//! Tracks what the agent did with the listening data it received, so the
//! user can see it at any time with `moodtrack status`.

pub mod log;

// Re-export commonly used types
pub use log::{
    create_shared_log, create_shared_log_with_persistence, SessionLog, SessionStats,
    SharedSessionLog,
};
