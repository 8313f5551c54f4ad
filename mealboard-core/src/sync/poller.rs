//! Periodic conditional reads.

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use super::engine::SyncEngine;
use super::error::SyncError;
use crate::merge::MergeReport;
use crate::store::{DocumentStore, FetchOutcome};

/// What a single poll did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// A local write was queued or in flight.
    Skipped,
    /// The server answered 304.
    NotModified,
    /// New tag, same content.
    Unchanged,
    /// First successful read replaced local state.
    Bootstrapped,
    Merged(MergeReport),
}

impl<S: DocumentStore + 'static> SyncEngine<S> {
    /// Run one conditional read and fold the result into local state.
    pub async fn poll_once(&self) -> Result<PollOutcome, SyncError> {
        let known = {
            let state = self.inner.state.lock();
            if state.bootstrapped && state.status.is_busy() {
                return Ok(PollOutcome::Skipped);
            }
            state.version.clone()
        };

        let (remote, tag) = match self.inner.store.fetch(known.as_ref()).await? {
            FetchOutcome::NotModified => return Ok(PollOutcome::NotModified),
            FetchOutcome::Fetched { document, tag } => (document, tag),
        };

        let mut state = self.inner.state.lock();
        if !state.bootstrapped {
            state.bootstrap(remote, tag);
            info!(version = ?state.version, "board loaded");
            return Ok(PollOutcome::Bootstrapped);
        }
        // A write started while we were reading; it will reconcile itself.
        if state.status.is_busy() {
            return Ok(PollOutcome::Skipped);
        }

        state.adopt_tag(tag);
        if state.document.same_content(&remote) {
            return Ok(PollOutcome::Unchanged);
        }
        let report = state.absorb(&remote, None);
        debug!(?report, "merged remote changes");
        Ok(PollOutcome::Merged(report))
    }

    /// Poll forever at the configured interval. Failures are logged and
    /// the next tick tries again.
    pub async fn run_poller(self) {
        let mut interval = tokio::time::interval(self.inner.options.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            match self.poll_once().await {
                Ok(outcome) => debug!(?outcome, "poll finished"),
                Err(e) => warn!(error = %e, "poll failed"),
            }
        }
    }

    pub fn spawn_poller(&self) -> JoinHandle<()> {
        tokio::spawn(self.clone().run_poller())
    }
}
