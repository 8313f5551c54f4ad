use std::collections::HashSet;

use uuid::Uuid;

use crate::models::GroceryItem;

/// Append every remote grocery item whose display text is not on the local
/// list yet. Placeholders are additionally matched by proposal id. Nothing
/// is removed. Returns the number of appended items.
pub fn merge_groceries(local: &mut Vec<GroceryItem>, remote: &[GroceryItem]) -> usize {
    let mut texts: HashSet<String> = local.iter().map(|i| i.text().to_string()).collect();
    let mut placeholders: HashSet<Uuid> = local
        .iter()
        .filter_map(|i| i.as_placeholder().map(|p| p.proposal_id))
        .collect();

    let mut added = 0;
    for item in remote {
        if texts.contains(item.text()) {
            continue;
        }
        if let Some(placeholder) = item.as_placeholder() {
            if !placeholders.insert(placeholder.proposal_id) {
                continue;
            }
        }
        texts.insert(item.text().to_string());
        local.push(item.clone());
        added += 1;
    }
    added
}
