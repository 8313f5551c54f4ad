//! Mealboard Core Library
//!
//! Shared board model, merge algorithm and sync engine for Mealboard
//! clients.

pub mod board;
pub mod lookup;
pub mod merge;
pub mod models;
pub mod session;
pub mod shopping;
pub mod store;
pub mod sync;

pub use board::BoardError;
pub use lookup::{Categories, LookupClient, LookupError};
pub use merge::{merge_document, MergeReport};
pub use models::{
    ActivityEntry, ActivityKind, Document, GroceryItem, Placeholder, Proposal, RecipeInfo,
    Settings, Slot, SlotKey, VersionTag,
};
pub use session::{SessionError, SessionStore};
pub use shopping::{aggregate, format_export, ShoppingLine};
pub use store::{DocumentStore, FetchOutcome, HttpStore, SaveOutcome, StoreError};
pub use sync::{PollOutcome, SaveFailure, SyncEngine, SyncError, SyncOptions, SyncStatus};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
