//! Reconciliation of a local board with a remote snapshot.
//!
//! Three independent reducers fold the remote copy into the local one in a
//! fixed order: slots, groceries, activity. Each takes `(local, remote)` and
//! mutates `local` in place. None of them ever removes local data, merging
//! the same snapshot twice is a no-op, and two clients that have merged each
//! other's state hold the same content.

mod activity;
mod groceries;
mod slots;

pub use activity::merge_activity;
pub use groceries::merge_groceries;
pub use slots::merge_slots;

use crate::models::Document;

/// What a merge changed in the local copy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub slots_added: usize,
    pub slots_updated: usize,
    pub proposals_added: usize,
    pub proposals_updated: usize,
    pub groceries_added: usize,
    pub activity_added: usize,
}

impl MergeReport {
    pub fn is_empty(&self) -> bool {
        *self == MergeReport::default()
    }
}

/// Fold `remote` into `local` with all three reducers.
///
/// Settings are not touched here; the store is authoritative for them and
/// callers adopt the remote settings wholesale.
pub fn merge_document(local: &mut Document, remote: &Document) -> MergeReport {
    let mut report = MergeReport::default();
    merge_slots(&mut local.slots, &remote.slots, &mut report);
    report.groceries_added = merge_groceries(&mut local.groceries, &remote.groceries);
    report.activity_added = merge_activity(&mut local.activity, &remote.activity);
    tracing::debug!(?report, "merged remote document");
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActivityEntry, ActivityKind, GroceryItem, Proposal, Slot};
    use chrono::{NaiveDate, TimeZone, Utc};

    fn board(user: &str, dish: &str, grocery: &str, minute: u32) -> Document {
        let date = NaiveDate::from_ymd_opt(2025, 12, 24).unwrap();
        let mut slot = Slot::new(date, "Abendessen");
        slot.proposals.push(Proposal::new(dish, user));

        let mut doc = Document::new();
        doc.slots.insert(slot.key(), slot);
        doc.groceries.push(GroceryItem::from(grocery));
        let mut entry =
            ActivityEntry::new(ActivityKind::Add, user, format!("hat \"{}\" vorgeschlagen", dish));
        entry.timestamp = Utc.with_ymd_and_hms(2025, 12, 1, 18, minute, 0).unwrap();
        doc.activity.push(entry);
        doc
    }

    #[test]
    fn test_merge_is_idempotent() {
        let mut local = board("Hamburg", "Fondue", "400g Käse", 5);
        let remote = board("Konstanz", "Raclette", "1kg Kartoffeln", 1);

        merge_document(&mut local, &remote);
        let once = local.clone();
        let report = merge_document(&mut local, &remote);

        assert!(report.is_empty());
        assert_eq!(local, once);
    }

    #[test]
    fn test_merge_keeps_local_creations() {
        let mut local = board("Hamburg", "Fondue", "400g Käse", 5);
        let remote = board("Konstanz", "Raclette", "1kg Kartoffeln", 1);
        let local_proposal = local.slots.values().next().unwrap().proposals[0].id;

        merge_document(&mut local, &remote);

        let slot = local.slots.values().next().unwrap();
        assert!(slot.proposal(local_proposal).is_some());
        assert_eq!(slot.proposals.len(), 2);
        assert_eq!(local.groceries.len(), 2);
        assert_eq!(local.activity.len(), 2);
    }

    #[test]
    fn test_merge_does_not_touch_settings() {
        let mut local = board("Hamburg", "Fondue", "400g Käse", 5);
        let mut remote = local.clone();
        remote.settings.organizer_pin = "1234".to_string();

        merge_document(&mut local, &remote);
        assert!(local.settings.organizer_pin.is_empty());
    }

    #[test]
    fn test_two_clients_converge_on_content() {
        let mut a = board("Hamburg", "Fondue", "400g Käse", 5);
        let mut b = board("Konstanz", "Raclette", "1kg Kartoffeln", 1);
        let a_before = a.clone();

        merge_document(&mut a, &b);
        merge_document(&mut b, &a_before);

        let a_slot = a.slots.values().next().unwrap();
        let b_slot = b.slots.values().next().unwrap();
        let mut a_ids: Vec<_> = a_slot.proposals.iter().map(|p| p.id).collect();
        let mut b_ids: Vec<_> = b_slot.proposals.iter().map(|p| p.id).collect();
        a_ids.sort();
        b_ids.sort();
        assert_eq!(a_ids, b_ids);
        assert_eq!(a.activity, b.activity);

        let mut a_groceries: Vec<_> = a.groceries.iter().map(|g| g.text().to_string()).collect();
        let mut b_groceries: Vec<_> = b.groceries.iter().map(|g| g.text().to_string()).collect();
        a_groceries.sort();
        b_groceries.sort();
        assert_eq!(a_groceries, b_groceries);
    }
}
