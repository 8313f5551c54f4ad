mod activity;
mod document;
mod grocery;
mod proposal;
mod recipe;
mod settings;
mod slot;

pub use activity::{ActivityEntry, ActivityKind, EntryKey};
pub use document::{Document, VersionTag};
pub use grocery::{GroceryItem, Placeholder, PLACEHOLDER_SUFFIX};
pub use proposal::Proposal;
pub use recipe::RecipeInfo;
pub use settings::Settings;
pub use slot::{is_dessert, Slot, SlotKey, DESSERT};

use serde::{Deserialize, Deserializer};

/// Treats an explicit JSON `null` like a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
