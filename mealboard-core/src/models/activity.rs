use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Kind of action recorded in the activity log.
///
/// Stored as a plain string so entries written by other clients with kinds
/// this build does not know survive a round trip unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    Add,
    Vote,
    Approve,
    Delete,
    Edit,
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActivityKind::Add => write!(f, "add"),
            ActivityKind::Vote => write!(f, "vote"),
            ActivityKind::Approve => write!(f, "approve"),
            ActivityKind::Delete => write!(f, "delete"),
            ActivityKind::Edit => write!(f, "edit"),
        }
    }
}

/// An append-only activity log entry.
///
/// Entries written before ids were introduced have no `id`; those are
/// identified by their full content instead.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActivityEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(rename = "type")]
    pub kind: String,
    pub user: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Merge identity of an activity entry. Also orders entries that share a
/// timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntryKey {
    Id(Uuid),
    Content(String),
}

impl ActivityEntry {
    pub fn new(kind: ActivityKind, user: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: Some(Uuid::new_v4()),
            kind: kind.to_string(),
            user: user.into(),
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn key(&self) -> EntryKey {
        match self.id {
            Some(id) => EntryKey::Id(id),
            None => EntryKey::Content(serde_json::to_string(self).unwrap_or_default()),
        }
    }
}

impl fmt::Display for ActivityEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.timestamp.format("%d.%m. %H:%M"),
            self.user,
            self.message
        )
    }
}
