use thiserror::Error;

use crate::store::StoreError;

/// Errors surfaced by the sync engine.
#[derive(Debug, Error)]
pub enum SyncError {
    /// No successful read has happened yet, so there is nothing safe to
    /// write or mutate.
    #[error("Board not loaded yet; waiting for the first successful read")]
    NotBootstrapped,
    #[error("Save gave up after {attempts} conflicting writes")]
    TooManyConflicts { attempts: u32 },
    #[error("Store answered a full read with 304 Not Modified")]
    UnexpectedNotModified,
    #[error(transparent)]
    Store(#[from] StoreError),
}
