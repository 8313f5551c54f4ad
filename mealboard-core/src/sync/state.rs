use crate::merge::{merge_document, MergeReport};
use crate::models::{Document, VersionTag};

use super::status::SyncStatus;

/// Everything the engine knows about the board at a point in time.
#[derive(Debug, Default)]
pub struct StateContainer {
    pub document: Document,
    /// Tag of the server copy `document` was last reconciled with.
    pub version: Option<VersionTag>,
    /// Set by the first successful read; nothing is written before.
    pub bootstrapped: bool,
    pub status: SyncStatus,
    /// Mutations happened since the last snapshot handed to the store.
    pub dirty: bool,
}

impl StateContainer {
    /// Replace local state with the server copy.
    pub fn bootstrap(&mut self, remote: Document, tag: Option<VersionTag>) {
        self.document = remote;
        self.adopt_tag(tag);
        self.bootstrapped = true;
    }

    /// Fold a server copy into local state and take over its settings.
    pub fn absorb(&mut self, remote: &Document, tag: Option<VersionTag>) -> MergeReport {
        let report = merge_document(&mut self.document, remote);
        self.document.settings = remote.settings.clone();
        self.adopt_tag(tag);
        report
    }

    pub fn adopt_tag(&mut self, tag: Option<VersionTag>) {
        if let Some(tag) = tag {
            self.version = Some(tag);
        }
    }

    /// Copy of the document to hand to the store, clearing the dirty flag.
    pub fn take_snapshot(&mut self) -> (Document, Option<VersionTag>) {
        self.dirty = false;
        (self.document.clone(), self.version.clone())
    }
}
