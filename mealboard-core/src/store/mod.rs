//! Versioned document store.
//!
//! The server keeps a single JSON document together with an opaque version
//! tag. Reads are conditional on the tag the client already knows and
//! writes are conditional on the tag the client last saw, so a write based
//! on a stale copy is rejected instead of overwriting someone else's work.

mod http;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Document, VersionTag};

pub use http::{build_http_url, HttpStore};

/// Result of a conditional read.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    /// The server copy still carries the tag we sent.
    NotModified,
    /// The server returned its current copy.
    Fetched {
        document: Document,
        tag: Option<VersionTag>,
    },
}

/// Result of a conditional write.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    Saved { tag: Option<VersionTag> },
    /// The server copy moved on since `expected` was read.
    Conflict,
}

/// Errors that can occur talking to the document store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Connection error: {0}")]
    Connection(String),
    #[error("Server returned status {0}")]
    Status(u16),
    #[error("Invalid document: {0}")]
    Decode(String),
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read the document. With `known` set the store may answer
    /// [`FetchOutcome::NotModified`].
    async fn fetch(&self, known: Option<&VersionTag>) -> Result<FetchOutcome, StoreError>;

    /// Write the document if the server copy still carries `expected`.
    /// Without `expected` the write is unconditional.
    async fn save(
        &self,
        document: &Document,
        expected: Option<&VersionTag>,
    ) -> Result<SaveOutcome, StoreError>;
}
