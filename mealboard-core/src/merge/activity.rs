use std::collections::HashSet;

use crate::models::ActivityEntry;

/// Union the activity logs by entry key, then sort ascending by timestamp.
///
/// This is the only reducer that reorders its collection. Entries with equal
/// timestamps are ordered by key, so every client ends up with the same log.
pub fn merge_activity(local: &mut Vec<ActivityEntry>, remote: &[ActivityEntry]) -> usize {
    let mut known: HashSet<_> = local.iter().map(ActivityEntry::key).collect();

    let mut added = 0;
    for entry in remote {
        if known.insert(entry.key()) {
            local.push(entry.clone());
            added += 1;
        }
    }

    local.sort_by_cached_key(|e| (e.timestamp, e.key()));
    added
}
