//! The shared board document.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use super::{ActivityEntry, GroceryItem, Settings, Slot, SlotKey};

/// Opaque revision token issued by the document store (an HTTP ETag).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionTag(String);

impl VersionTag {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VersionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The whole board as stored on the server.
///
/// Slots live in a `BTreeMap` so the serialized form is canonical: two
/// documents with equal content serialize to identical strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Document {
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub slots: BTreeMap<SlotKey, Slot>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub groceries: Vec<GroceryItem>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub activity: Vec<ActivityEntry>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub settings: Settings,
}

const DOCUMENT_KEYS: [&str; 4] = ["slots", "groceries", "activity", "settings"];

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a document body as returned by the store.
    ///
    /// Accepts the current shape, an empty object (store never written) and
    /// the legacy shape where the body is the bare slot map.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        let legacy = matches!(
            &value,
            Value::Object(map)
                if !map.is_empty() && !DOCUMENT_KEYS.iter().any(|k| map.contains_key(*k))
        );
        if legacy {
            let slots = serde_json::from_value(value)?;
            return Ok(Self {
                slots,
                ..Self::default()
            });
        }
        if value.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(value)
    }

    pub fn from_json(body: &str) -> Result<Self, serde_json::Error> {
        Self::from_value(serde_json::from_str(body)?)
    }

    /// Canonical serialization used to detect whether two copies differ.
    pub fn canonical(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn same_content(&self, other: &Document) -> bool {
        self.canonical() == other.canonical()
    }

    pub fn slot(&self, key: &SlotKey) -> Option<&Slot> {
        self.slots.get(key)
    }

    pub fn slot_mut(&mut self, key: &SlotKey) -> Option<&mut Slot> {
        self.slots.get_mut(key)
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty() && self.groceries.is_empty() && self.activity.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Proposal;
    use chrono::NaiveDate;

    #[test]
    fn test_empty_object_is_empty_document() {
        let doc = Document::from_json("{}").unwrap();
        assert!(doc.is_empty());
        assert_eq!(doc.settings, Settings::default());
    }

    #[test]
    fn test_null_is_empty_document() {
        assert!(Document::from_json("null").unwrap().is_empty());
    }

    #[test]
    fn test_full_document() {
        let json = r#"{
            "slots": {"2025-12-24_abendessen": {"date":"2025-12-24","type":"Abendessen","approved":false,"proposals":[]}},
            "groceries": ["200g Mehl"],
            "activity": [],
            "settings": {"organizerPin": "1234"}
        }"#;
        let doc = Document::from_json(json).unwrap();

        assert_eq!(doc.slots.len(), 1);
        assert!(doc.slot(&SlotKey::from("2025-12-24_abendessen")).is_some());
        assert_eq!(doc.groceries.len(), 1);
        assert_eq!(doc.settings.organizer_pin, "1234");
    }

    #[test]
    fn test_legacy_bare_slot_map() {
        let json = r#"{"2025-12-24_abendessen": {"date":"2025-12-24","type":"Abendessen","proposals":[]}}"#;
        let doc = Document::from_json(json).unwrap();

        assert_eq!(doc.slots.len(), 1);
        assert!(doc.groceries.is_empty());
    }

    #[test]
    fn test_partial_document_defaults_missing_keys() {
        let doc = Document::from_json(r#"{"groceries": ["Salz"]}"#).unwrap();
        assert!(doc.slots.is_empty());
        assert_eq!(doc.groceries.len(), 1);
    }

    #[test]
    fn test_canonical_is_order_independent_for_slots() {
        let eve = NaiveDate::from_ymd_opt(2025, 12, 24).unwrap();
        let day = NaiveDate::from_ymd_opt(2025, 12, 25).unwrap();

        let mut a = Document::new();
        let mut b = Document::new();
        let lunch = Slot::new(day, "Mittagessen");
        let mut dinner = Slot::new(eve, "Abendessen");
        dinner.proposals.push(Proposal::new("Fondue", "Eltern"));

        a.slots.insert(lunch.key(), lunch.clone());
        a.slots.insert(dinner.key(), dinner.clone());
        b.slots.insert(dinner.key(), dinner);
        b.slots.insert(lunch.key(), lunch);

        assert!(a.same_content(&b));
    }

    #[test]
    fn test_wire_shape() {
        let value = serde_json::to_value(Document::new()).unwrap();
        for key in DOCUMENT_KEYS {
            assert!(value.get(key).is_some(), "missing {}", key);
        }
    }
}
