use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::Proposal;

/// Meal type that only accepts other desserts when copying proposals.
pub const DESSERT: &str = "Dessert";

/// Key of a slot in the document: `"{date}_{lowercased meal type}"`.
///
/// Globally unique per (date, meal type) pair, so two clients creating the
/// same slot independently end up with the same key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotKey(String);

impl SlotKey {
    pub fn new(date: NaiveDate, meal_type: &str) -> Self {
        Self(format!("{}_{}", date, meal_type.to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SlotKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A (date, meal type) planning unit holding candidate proposals.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Slot {
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub meal_type: String,
    #[serde(default)]
    pub approved: bool,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub proposals: Vec<Proposal>,
}

impl Slot {
    pub fn new(date: NaiveDate, meal_type: impl Into<String>) -> Self {
        Self {
            date,
            meal_type: meal_type.into(),
            approved: false,
            proposals: Vec::new(),
        }
    }

    pub fn key(&self) -> SlotKey {
        SlotKey::new(self.date, &self.meal_type)
    }

    pub fn is_dessert(&self) -> bool {
        is_dessert(&self.meal_type)
    }

    pub fn proposal(&self, id: Uuid) -> Option<&Proposal> {
        self.proposals.iter().find(|p| p.id == id)
    }

    pub fn proposal_mut(&mut self, id: Uuid) -> Option<&mut Proposal> {
        self.proposals.iter_mut().find(|p| p.id == id)
    }

    /// The approved proposal, if the slot has been decided.
    pub fn winner(&self) -> Option<&Proposal> {
        if !self.approved {
            return None;
        }
        self.proposals.iter().find(|p| p.approved)
    }

    /// Proposals ordered by vote count, most votes first. Ties keep
    /// insertion order.
    pub fn ranked(&self) -> Vec<&Proposal> {
        let mut ranked: Vec<&Proposal> = self.proposals.iter().collect();
        ranked.sort_by(|a, b| b.vote_count().cmp(&a.vote_count()));
        ranked
    }

    /// The proposal currently in the lead: most votes (at least one), ties
    /// resolved in favour of the first such proposal.
    pub fn leader(&self) -> Option<&Proposal> {
        self.ranked().into_iter().next().filter(|p| p.vote_count() > 0)
    }

    pub fn has_proposal_named(&self, name: &str) -> bool {
        let name_lower = name.to_lowercase();
        self.proposals
            .iter()
            .any(|p| p.name.to_lowercase() == name_lower)
    }
}

pub fn is_dessert(meal_type: &str) -> bool {
    meal_type.eq_ignore_ascii_case(DESSERT)
}
