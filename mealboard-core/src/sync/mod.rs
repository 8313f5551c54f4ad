//! Client-side synchronization with the board server.
//!
//! The [`SyncEngine`] owns the local copy of the board. Two loops keep it in
//! step with the server:
//!
//! - the poller reads the server copy every few seconds with `If-None-Match`
//!   and merges anything new into local state;
//! - the writer saves local changes with `If-Match`, debounced so a burst of
//!   edits becomes one write. A 409 means someone else wrote first: the
//!   writer reads the server copy, merges, and tries again a bounded number
//!   of times.

mod engine;
mod error;
mod poller;
mod state;
mod status;
mod writer;

#[cfg(test)]
pub(crate) mod testing;

use std::time::Duration;

pub use engine::SyncEngine;
pub use error::SyncError;
pub use poller::PollOutcome;
pub use state::StateContainer;
pub use status::{SaveFailure, SyncStatus};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_secs(2);
pub const DEFAULT_MAX_CONFLICT_RETRIES: u32 = 3;

/// Timing and retry knobs for the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    pub poll_interval: Duration,
    /// Quiet period after the last mutation before a write.
    pub debounce: Duration,
    /// Merge-and-retry cycles before a conflicting write gives up.
    pub max_conflict_retries: u32,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            debounce: DEFAULT_DEBOUNCE,
            max_conflict_retries: DEFAULT_MAX_CONFLICT_RETRIES,
        }
    }
}
