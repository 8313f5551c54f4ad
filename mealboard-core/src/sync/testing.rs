//! In-memory store with scriptable responses for engine tests.

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::Instant;

use super::{SyncEngine, SyncOptions};
use crate::models::{Document, VersionTag};
use crate::store::{DocumentStore, FetchOutcome, SaveOutcome, StoreError};

/// Forced answer for the next write. Unscripted writes behave like the
/// real server: accepted when the precondition matches, 409 otherwise.
#[derive(Debug, Clone, Copy)]
pub enum ScriptedSave {
    Conflict,
    Fail(u16),
    AcceptWithoutTag,
}

#[derive(Default)]
struct Script {
    document: Document,
    revision: u64,
    saves: VecDeque<ScriptedSave>,
    failing_fetches: usize,
    fetch_count: usize,
    save_times: Vec<Instant>,
}

impl Script {
    fn tag(&self) -> VersionTag {
        VersionTag::new(format!("\"v{}\"", self.revision))
    }

    fn commit(&mut self, document: &Document) {
        self.document = document.clone();
        self.revision += 1;
    }
}

#[derive(Default)]
pub struct ScriptedStore {
    script: Mutex<Script>,
}

impl ScriptedStore {
    pub fn script_saves(&self, saves: impl IntoIterator<Item = ScriptedSave>) {
        self.script.lock().saves.extend(saves);
    }

    pub fn fail_next_fetches(&self, count: usize) {
        self.script.lock().failing_fetches = count;
    }

    /// Change the server copy the way another client would.
    pub fn remote_edit(&self, f: impl FnOnce(&mut Document)) {
        let mut script = self.script.lock();
        f(&mut script.document);
        script.revision += 1;
    }

    pub fn document(&self) -> Document {
        self.script.lock().document.clone()
    }

    pub fn current_tag(&self) -> VersionTag {
        self.script.lock().tag()
    }

    pub fn fetch_count(&self) -> usize {
        self.script.lock().fetch_count
    }

    pub fn save_count(&self) -> usize {
        self.script.lock().save_times.len()
    }

    pub fn save_times(&self) -> Vec<Instant> {
        self.script.lock().save_times.clone()
    }
}

#[async_trait]
impl DocumentStore for ScriptedStore {
    async fn fetch(&self, known: Option<&VersionTag>) -> Result<FetchOutcome, StoreError> {
        let mut script = self.script.lock();
        script.fetch_count += 1;
        if script.failing_fetches > 0 {
            script.failing_fetches -= 1;
            return Err(StoreError::Connection("connection refused".into()));
        }

        let tag = script.tag();
        if known == Some(&tag) {
            return Ok(FetchOutcome::NotModified);
        }
        Ok(FetchOutcome::Fetched {
            document: script.document.clone(),
            tag: Some(tag),
        })
    }

    async fn save(
        &self,
        document: &Document,
        expected: Option<&VersionTag>,
    ) -> Result<SaveOutcome, StoreError> {
        let mut script = self.script.lock();
        script.save_times.push(Instant::now());

        match script.saves.pop_front() {
            Some(ScriptedSave::Conflict) => Ok(SaveOutcome::Conflict),
            Some(ScriptedSave::Fail(status)) => Err(StoreError::Status(status)),
            Some(ScriptedSave::AcceptWithoutTag) => {
                script.commit(document);
                Ok(SaveOutcome::Saved { tag: None })
            }
            None => {
                if expected.is_some_and(|tag| *tag != script.tag()) {
                    return Ok(SaveOutcome::Conflict);
                }
                script.commit(document);
                Ok(SaveOutcome::Saved {
                    tag: Some(script.tag()),
                })
            }
        }
    }
}

/// Engine over `store` that has completed its first read.
pub async fn bootstrapped(store: ScriptedStore) -> SyncEngine<ScriptedStore> {
    let engine = SyncEngine::new(store, SyncOptions::default());
    if let Err(e) = engine.poll_once().await {
        panic!("bootstrap failed: {}", e);
    }
    engine
}
