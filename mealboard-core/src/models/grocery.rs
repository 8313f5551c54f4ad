//! Grocery list entries.
//!
//! The shared list holds either free-text ingredients or placeholders that
//! stand in for an approved proposal whose ingredients are not known yet.
//! On the wire a text item is a bare JSON string and a placeholder is an
//! object carrying `isPlaceholder: true`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Suffix appended to a dish name to build a placeholder's display text.
pub const PLACEHOLDER_SUFFIX: &str = "(Zutaten prüfen)";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum GroceryItem {
    Text(String),
    Placeholder(Placeholder),
}

impl GroceryItem {
    /// Display text, also used as the identity when merging lists.
    pub fn text(&self) -> &str {
        match self {
            GroceryItem::Text(text) => text,
            GroceryItem::Placeholder(p) => &p.text,
        }
    }

    pub fn as_placeholder(&self) -> Option<&Placeholder> {
        match self {
            GroceryItem::Placeholder(p) => Some(p),
            GroceryItem::Text(_) => None,
        }
    }

    pub fn is_placeholder_for(&self, proposal_id: Uuid) -> bool {
        self.as_placeholder()
            .is_some_and(|p| p.proposal_id == proposal_id)
    }
}

impl From<&str> for GroceryItem {
    fn from(s: &str) -> Self {
        GroceryItem::Text(s.to_string())
    }
}

impl From<String> for GroceryItem {
    fn from(s: String) -> Self {
        GroceryItem::Text(s)
    }
}

impl fmt::Display for GroceryItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// Stand-in for an approved dish whose ingredients still need resolving.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Placeholder {
    pub text: String,
    #[serde(default = "placeholder_flag")]
    pub is_placeholder: bool,
    pub proposal_id: Uuid,
    pub dish_name: String,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub meal_type: String,
}

fn placeholder_flag() -> bool {
    true
}

impl Placeholder {
    pub fn new(
        proposal_id: Uuid,
        dish_name: impl Into<String>,
        date: NaiveDate,
        meal_type: impl Into<String>,
    ) -> Self {
        let dish_name = dish_name.into();
        Self {
            text: format!("{} {}", dish_name, PLACEHOLDER_SUFFIX),
            is_placeholder: true,
            proposal_id,
            dish_name,
            date,
            meal_type: meal_type.into(),
        }
    }
}
