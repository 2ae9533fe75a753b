//! Card collection storage
//!
//! The pipeline hands finished cards to a `CardStore`; a card is valid
//! whether or not saving it succeeds.

mod json;

pub use json::JsonCollectionStore;

use uuid::Uuid;

use crate::error::Result;
use crate::types::CardRecord;

/// Default number of cards kept before the oldest are evicted.
pub const DEFAULT_MAX_CARDS: usize = 100;

/// Persistent card collection.
pub trait CardStore: Send + Sync {
    /// Insert a card, replacing any card with the same id.
    fn save(&self, card: &CardRecord) -> Result<()>;

    /// All cards, newest first.
    fn load_all(&self) -> Result<Vec<CardRecord>>;

    fn get(&self, id: Uuid) -> Result<Option<CardRecord>>;

    /// Remove a card; returns whether it existed.
    fn delete(&self, id: Uuid) -> Result<bool>;
}
