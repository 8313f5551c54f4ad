//! Shared handle over the board state.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

use super::error::SyncError;
use super::state::StateContainer;
use super::status::SyncStatus;
use super::SyncOptions;
use crate::models::{Document, VersionTag};
use crate::store::DocumentStore;

pub(super) struct Inner<S> {
    pub(super) store: S,
    pub(super) options: SyncOptions,
    /// Never held across an `.await`.
    pub(super) state: Mutex<StateContainer>,
    /// Serializes writes so a debounced save and a direct save never race.
    pub(super) write_lock: tokio::sync::Mutex<()>,
    pub(super) debounce: Mutex<Option<JoinHandle<()>>>,
}

/// Cloneable handle to the local board and its sync machinery.
///
/// All clones share one document. Mutations go through [`SyncEngine::update`],
/// which schedules a debounced save; the poller and the writer keep the
/// local copy and the server copy reconciled.
pub struct SyncEngine<S> {
    pub(super) inner: Arc<Inner<S>>,
}

impl<S> Clone for SyncEngine<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: DocumentStore + 'static> SyncEngine<S> {
    pub fn new(store: S, options: SyncOptions) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                options,
                state: Mutex::new(StateContainer::default()),
                write_lock: tokio::sync::Mutex::new(()),
                debounce: Mutex::new(None),
            }),
        }
    }

    pub fn store(&self) -> &S {
        &self.inner.store
    }

    pub fn options(&self) -> &SyncOptions {
        &self.inner.options
    }

    pub fn status(&self) -> SyncStatus {
        self.inner.state.lock().status.clone()
    }

    pub fn version(&self) -> Option<VersionTag> {
        self.inner.state.lock().version.clone()
    }

    pub fn is_bootstrapped(&self) -> bool {
        self.inner.state.lock().bootstrapped
    }

    /// Copy of the current local document.
    pub fn snapshot(&self) -> Document {
        self.inner.state.lock().document.clone()
    }

    /// Run a read-only closure against the local document.
    pub fn read<R>(&self, f: impl FnOnce(&Document) -> R) -> R {
        f(&self.inner.state.lock().document)
    }

    /// Apply a mutation to the local document and schedule a save.
    ///
    /// Fails before the first successful read, because that read replaces
    /// local state.
    pub fn update<R>(&self, f: impl FnOnce(&mut Document) -> R) -> Result<R, SyncError> {
        let result = self.apply(f)?;
        self.mark_dirty();
        Ok(result)
    }

    /// Apply a mutation and write it immediately, bypassing the debounce.
    pub async fn update_now<R>(&self, f: impl FnOnce(&mut Document) -> R) -> Result<R, SyncError> {
        let result = self.apply(f)?;
        self.save_now().await?;
        Ok(result)
    }

    fn apply<R>(&self, f: impl FnOnce(&mut Document) -> R) -> Result<R, SyncError> {
        let mut state = self.inner.state.lock();
        if !state.bootstrapped {
            return Err(SyncError::NotBootstrapped);
        }
        let result = f(&mut state.document);
        state.dirty = true;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{bootstrapped, ScriptedStore};
    use super::*;

    #[tokio::test]
    async fn test_update_before_bootstrap_is_rejected() {
        let engine = SyncEngine::new(ScriptedStore::default(), SyncOptions::default());
        let result = engine.update(|doc| doc.add_grocery("Brot"));

        assert!(matches!(result, Err(SyncError::NotBootstrapped)));
        assert!(engine.snapshot().groceries.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_clones_share_state() {
        let engine = bootstrapped(ScriptedStore::default()).await;
        let other = engine.clone();

        other.update(|doc| doc.add_grocery("Brot")).unwrap();

        assert_eq!(engine.read(|doc| doc.groceries.len()), 1);
        assert_eq!(engine.status(), SyncStatus::Pending);
    }
}
