use std::fmt;

/// Why the last save attempt ended in an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveFailure {
    /// Every retry hit another conflicting write.
    TooManyConflicts,
    Failed(String),
}

/// Save state shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SyncStatus {
    #[default]
    Saved,
    /// Local changes waiting for the debounce timer.
    Pending,
    /// A write is in flight.
    Syncing,
    /// A write conflicted and the engine is merging before retry `attempt`.
    ResolvingConflict { attempt: u32 },
    Error(SaveFailure),
}

impl SyncStatus {
    /// True while local changes are queued or being written. The poller
    /// stays out of the way in these states.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            SyncStatus::Pending | SyncStatus::Syncing | SyncStatus::ResolvingConflict { .. }
        )
    }

    pub fn is_error(&self) -> bool {
        matches!(self, SyncStatus::Error(_))
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncStatus::Saved => write!(f, "Gespeichert"),
            SyncStatus::Pending => write!(f, "Ungespeicherte Änderungen"),
            SyncStatus::Syncing => write!(f, "Speichert..."),
            SyncStatus::ResolvingConflict { attempt } => {
                write!(f, "Konflikt wird gelöst (Versuch {})", attempt)
            }
            SyncStatus::Error(SaveFailure::TooManyConflicts) => {
                write!(f, "Zu viele Konflikte, Änderungen nicht gespeichert")
            }
            SyncStatus::Error(SaveFailure::Failed(reason)) => {
                write!(f, "Fehler beim Speichern: {}", reason)
            }
        }
    }
}
