//! Connection to the board for one CLI invocation.

use std::time::Duration;

use mealboard_core::{
    Document, HttpStore, LookupClient, SessionStore, SlotKey, SyncEngine, SyncError,
};
use tokio::runtime::Runtime;
use uuid::Uuid;

use crate::config::Config;

/// Time the first read may take before giving up.
const LOAD_TIMEOUT: Duration = Duration::from_secs(20);

/// Errors raised by the CLI itself.
#[derive(Debug)]
pub enum CliError {
    RuntimeError(String),
    LoadTimeout,
    NotLoggedIn,
    NotOrganizer(String),
    UnknownRole(String),
    WrongPin,
    UnknownMealType(String),
    InvalidDate(String),
    ProposalNotFound(String),
    AmbiguousProposal(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::RuntimeError(e) => write!(f, "Runtime error: {}", e),
            CliError::LoadTimeout => write!(f, "Timed out loading the board from the server"),
            CliError::NotLoggedIn => {
                write!(f, "Not logged in. Use 'mealboard login <role>' first.")
            }
            CliError::NotOrganizer(role) => {
                write!(f, "Only the {} may do this.", role)
            }
            CliError::UnknownRole(role) => write!(f, "Unknown role: {}", role),
            CliError::WrongPin => write!(f, "Wrong PIN"),
            CliError::UnknownMealType(t) => write!(f, "Unknown meal type: {}", t),
            CliError::InvalidDate(d) => {
                write!(f, "Invalid date '{}'. Use YYYY-MM-DD.", d)
            }
            CliError::ProposalNotFound(id) => write!(f, "No proposal with id {}", id),
            CliError::AmbiguousProposal(id) => {
                write!(f, "Id prefix '{}' matches several proposals", id)
            }
        }
    }
}

impl std::error::Error for CliError {}

/// Runtime, sync engine and session for a command.
pub struct BoardContext<'a> {
    pub config: &'a Config,
    pub runtime: Runtime,
    pub engine: SyncEngine<HttpStore>,
    pub session: SessionStore,
}

impl<'a> BoardContext<'a> {
    /// Connect to the server and load the board.
    pub fn open(config: &'a Config) -> Result<Self, Box<dyn std::error::Error>> {
        let runtime = Runtime::new().map_err(|e| CliError::RuntimeError(e.to_string()))?;
        let store = HttpStore::new(config.server_url.value.clone())?;
        let engine = SyncEngine::new(store, config.sync.options());

        runtime.block_on(async {
            tokio::time::timeout(LOAD_TIMEOUT, engine.poll_once())
                .await
                .map_err(|_| CliError::LoadTimeout)
        })??;
        tracing::debug!(version = ?engine.version(), "board ready");

        Ok(Self {
            config,
            runtime,
            engine,
            session: SessionStore::new(&config.data_dir.value),
        })
    }

    pub fn lookup(&self) -> Result<LookupClient, Box<dyn std::error::Error>> {
        Ok(LookupClient::new(self.config.server_url.value.clone())?)
    }

    pub fn document(&self) -> Document {
        self.engine.snapshot()
    }

    /// The logged-in role.
    pub fn user(&self) -> Result<String, Box<dyn std::error::Error>> {
        let role = self.session.load()?.ok_or(CliError::NotLoggedIn)?;
        Ok(role)
    }

    /// The logged-in role, which must be the organizer.
    pub fn organizer(&self) -> Result<String, Box<dyn std::error::Error>> {
        let role = self.user()?;
        if !self.config.board.is_organizer(&role) {
            return Err(CliError::NotOrganizer(self.config.board.organizer_role.clone()).into());
        }
        Ok(role)
    }

    /// Apply a board mutation and write it to the server right away.
    pub fn mutate<R>(
        &self,
        f: impl FnOnce(&mut Document) -> R,
    ) -> Result<R, SyncError> {
        self.runtime.block_on(self.engine.update_now(f))
    }

    /// Find a proposal by full id or unique id prefix.
    pub fn find_proposal(&self, prefix: &str) -> Result<(SlotKey, Uuid), CliError> {
        let document = self.engine.snapshot();
        find_proposal(&document, prefix)
    }
}

/// Resolve a (possibly abbreviated) proposal id.
pub fn find_proposal(document: &Document, prefix: &str) -> Result<(SlotKey, Uuid), CliError> {
    let prefix = prefix.trim().to_lowercase();
    let wanted = prefix.as_str();
    let matches: Vec<(SlotKey, Uuid)> = document
        .slots
        .iter()
        .flat_map(move |(key, slot)| {
            slot.proposals
                .iter()
                .filter(move |p| p.id.to_string().starts_with(wanted))
                .map(move |p| (key.clone(), p.id))
        })
        .collect();

    match matches.as_slice() {
        [] => Err(CliError::ProposalNotFound(prefix)),
        [found] if !prefix.is_empty() => Ok(found.clone()),
        _ => Err(CliError::AmbiguousProposal(prefix)),
    }
}

/// First eight characters of an id, as shown in listings.
pub fn short_id(id: &Uuid) -> String {
    id.to_string()[..8].to_string()
}
