//! Conditional writes, conflict resolution and the save debounce.

use tracing::{debug, info, warn};

use super::engine::SyncEngine;
use super::error::SyncError;
use super::status::{SaveFailure, SyncStatus};
use crate::models::{Document, VersionTag};
use crate::store::{DocumentStore, FetchOutcome, SaveOutcome};

impl<S: DocumentStore + 'static> SyncEngine<S> {
    /// Record that the local document changed and (re)arm the debounce
    /// timer. Only the last of a burst of calls leads to a write.
    ///
    /// Outside a tokio runtime no timer is armed; the change stays pending
    /// until the next explicit save.
    pub fn mark_dirty(&self) {
        {
            let mut state = self.inner.state.lock();
            state.dirty = true;
            if !matches!(
                state.status,
                SyncStatus::Syncing | SyncStatus::ResolvingConflict { .. }
            ) {
                state.status = SyncStatus::Pending;
            }
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("no tokio runtime, debounced save not scheduled");
            return;
        };

        let engine = self.clone();
        let delay = self.inner.options.debounce;
        let mut timer = self.inner.debounce.lock();
        if let Some(pending) = timer.take() {
            pending.abort();
        }
        *timer = Some(runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            // Detach the write so re-arming the timer can't cancel it midway.
            tokio::spawn(async move {
                if let Err(e) = engine.save().await {
                    warn!(error = %e, "debounced save failed");
                }
            });
        }));
    }

    /// Cancel any pending debounce timer and write right away.
    pub async fn save_now(&self) -> Result<(), SyncError> {
        self.cancel_debounce();
        self.save().await
    }

    /// Write now if a debounced save is still pending.
    pub async fn flush(&self) -> Result<(), SyncError> {
        let pending = self.inner.debounce.lock().take();
        match pending {
            Some(handle) => {
                handle.abort();
                self.save().await
            }
            None => Ok(()),
        }
    }

    fn cancel_debounce(&self) {
        if let Some(pending) = self.inner.debounce.lock().take() {
            pending.abort();
        }
    }

    /// Write the local document with `If-Match`.
    ///
    /// A conflict triggers a full read, a merge and another attempt. After
    /// `max_conflict_retries` merge cycles a further conflict is final.
    pub async fn save(&self) -> Result<(), SyncError> {
        let _writing = self.inner.write_lock.lock().await;

        let (mut document, mut expected) = {
            let mut state = self.inner.state.lock();
            if !state.bootstrapped {
                return Err(SyncError::NotBootstrapped);
            }
            state.status = SyncStatus::Syncing;
            state.take_snapshot()
        };

        let max_retries = self.inner.options.max_conflict_retries;
        let mut attempt = 0;
        loop {
            let outcome = self.inner.store.save(&document, expected.as_ref()).await;
            match outcome {
                Ok(SaveOutcome::Saved { tag }) => {
                    let tag = match tag {
                        Some(tag) => Some(tag),
                        None => self.refresh_tag().await,
                    };
                    let mut state = self.inner.state.lock();
                    state.adopt_tag(tag);
                    state.status = if state.dirty {
                        SyncStatus::Pending
                    } else {
                        SyncStatus::Saved
                    };
                    info!(version = ?state.version, attempts = attempt + 1, "board saved");
                    return Ok(());
                }
                Ok(SaveOutcome::Conflict) if attempt >= max_retries => {
                    warn!(attempts = attempt + 1, "giving up after repeated conflicts");
                    self.fail(SaveFailure::TooManyConflicts);
                    return Err(SyncError::TooManyConflicts {
                        attempts: attempt + 1,
                    });
                }
                Ok(SaveOutcome::Conflict) => {
                    attempt += 1;
                    warn!(attempt, "save conflicted, merging server copy");
                    self.inner.state.lock().status = SyncStatus::ResolvingConflict { attempt };
                    (document, expected) = self.resolve_conflict().await?;
                }
                Err(e) => {
                    self.fail(SaveFailure::Failed(e.to_string()));
                    return Err(e.into());
                }
            }
        }
    }

    /// Fetch the server copy unconditionally and merge it into local state.
    /// Returns the merged document and the tag to retry with.
    async fn resolve_conflict(&self) -> Result<(Document, Option<VersionTag>), SyncError> {
        let fetched = self.inner.store.fetch(None).await;
        let (remote, tag) = match fetched {
            Ok(FetchOutcome::Fetched { document, tag }) => (document, tag),
            Ok(FetchOutcome::NotModified) => {
                let err = SyncError::UnexpectedNotModified;
                self.fail(SaveFailure::Failed(err.to_string()));
                return Err(err);
            }
            Err(e) => {
                self.fail(SaveFailure::Failed(e.to_string()));
                return Err(e.into());
            }
        };

        let mut state = self.inner.state.lock();
        let report = state.absorb(&remote, tag);
        debug!(?report, "merged server copy after conflict");
        Ok(state.take_snapshot())
    }

    /// The store accepted a write without returning a tag; read it back so
    /// the next write has a precondition.
    async fn refresh_tag(&self) -> Option<VersionTag> {
        match self.inner.store.fetch(None).await {
            Ok(FetchOutcome::Fetched { document, tag }) => {
                let mut state = self.inner.state.lock();
                state.absorb(&document, None);
                tag
            }
            Ok(FetchOutcome::NotModified) => None,
            Err(e) => {
                warn!(error = %e, "could not refresh version after save");
                None
            }
        }
    }

    fn fail(&self, failure: SaveFailure) {
        self.inner.state.lock().status = SyncStatus::Error(failure);
    }

    /// Apply a mutation that merging would undo, such as a reset or a
    /// settings change, on top of the latest server copy and write it.
    ///
    /// The server copy is read and merged first, then `f` runs on local
    /// state and the result is written against the fresh tag. A conflict
    /// repeats both steps, so `f` has to be idempotent.
    pub async fn overwrite_now(&self, f: impl Fn(&mut Document)) -> Result<(), SyncError> {
        self.cancel_debounce();
        let _writing = self.inner.write_lock.lock().await;

        let max_retries = self.inner.options.max_conflict_retries;
        let mut attempt = 0;
        loop {
            let fetched = self.inner.store.fetch(None).await?;
            let (document, expected) = {
                let mut state = self.inner.state.lock();
                if !state.bootstrapped {
                    return Err(SyncError::NotBootstrapped);
                }
                if let FetchOutcome::Fetched { document, tag } = fetched {
                    state.absorb(&document, tag);
                }
                f(&mut state.document);
                state.status = SyncStatus::Syncing;
                state.take_snapshot()
            };

            match self.inner.store.save(&document, expected.as_ref()).await {
                Ok(SaveOutcome::Saved { tag }) => {
                    let mut state = self.inner.state.lock();
                    state.adopt_tag(tag);
                    state.status = SyncStatus::Saved;
                    info!("board overwritten");
                    return Ok(());
                }
                Ok(SaveOutcome::Conflict) if attempt >= max_retries => {
                    self.fail(SaveFailure::TooManyConflicts);
                    return Err(SyncError::TooManyConflicts {
                        attempts: attempt + 1,
                    });
                }
                Ok(SaveOutcome::Conflict) => attempt += 1,
                Err(e) => {
                    self.fail(SaveFailure::Failed(e.to_string()));
                    return Err(e.into());
                }
            }
        }
    }
}
