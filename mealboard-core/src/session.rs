//! Persistent login state.
//!
//! The board has no accounts; a "login" is picking one of the configured
//! roles (e.g. a household or the organizer). The last role is remembered
//! in a single small file so the next run starts logged in.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

const SESSION_FILE: &str = "session";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to access session file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Role name must not be empty")]
    EmptyRole,
}

/// File-backed store for the current role.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Session kept in `data_dir`.
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(SESSION_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The remembered role, if any.
    pub fn load(&self) -> Result<Option<String>, SessionError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let role = contents.trim();
                Ok((!role.is_empty()).then(|| role.to_string()))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_error(e)),
        }
    }

    pub fn save(&self, role: &str) -> Result<(), SessionError> {
        let role = role.trim();
        if role.is_empty() {
            return Err(SessionError::EmptyRole);
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        fs::write(&self.path, role).map_err(|e| self.io_error(e))
    }

    /// Forget the role. Clearing an absent session is not an error.
    pub fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn io_error(&self, source: io::Error) -> SessionError {
        SessionError::Io {
            path: self.path.clone(),
            source,
        }
    }
}
