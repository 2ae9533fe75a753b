//! JSON file backed collection.

use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::types::CardRecord;

use super::CardStore;

/// Collection stored as a single pretty-printed JSON array.
///
/// Writes go to a sibling temp file that is renamed into place.
pub struct JsonCollectionStore {
    path: PathBuf,
    max_cards: usize,
    lock: Mutex<()>,
}

impl JsonCollectionStore {
    pub fn new(path: impl Into<PathBuf>, max_cards: usize) -> Self {
        Self {
            path: path.into(),
            max_cards: max_cards.max(1),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn max_cards(&self) -> usize {
        self.max_cards
    }

    fn read(&self) -> Result<Vec<CardRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let data = fs::read_to_string(&self.path).map_err(|e| Error::IoRead {
            path: self.path.clone(),
            source: e,
        })?;
        if data.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&data).map_err(|e| Error::Storage {
            path: self.path.clone(),
            message: format!("collection is not valid JSON: {}", e),
        })
    }

    fn write(&self, cards: &[CardRecord]) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| Error::IoWrite {
                path: dir.to_path_buf(),
                source: e,
            })?;
        }

        let data = serde_json::to_string_pretty(cards)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, data).map_err(|e| Error::IoWrite {
            path: tmp.clone(),
            source: e,
        })?;
        fs::rename(&tmp, &self.path).map_err(|e| Error::IoWrite {
            path: self.path.clone(),
            source: e,
        })
    }
}

fn newest_first(cards: &mut [CardRecord]) {
    cards.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

impl CardStore for JsonCollectionStore {
    fn save(&self, card: &CardRecord) -> Result<()> {
        let _guard = self.lock.lock();

        let mut cards = self.read()?;
        cards.retain(|c| c.id != card.id);
        cards.push(card.clone());
        newest_first(&mut cards);

        if cards.len() > self.max_cards {
            let evicted = cards.len() - self.max_cards;
            cards.truncate(self.max_cards);
            debug!(evicted, max_cards = self.max_cards, "Evicted oldest cards");
        }

        self.write(&cards)?;
        info!(card = %card.id, name = %card.name, total = cards.len(), "Card saved");
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<CardRecord>> {
        let _guard = self.lock.lock();
        let mut cards = self.read()?;
        newest_first(&mut cards);
        Ok(cards)
    }

    fn get(&self, id: Uuid) -> Result<Option<CardRecord>> {
        let _guard = self.lock.lock();
        Ok(self.read()?.into_iter().find(|c| c.id == id))
    }

    fn delete(&self, id: Uuid) -> Result<bool> {
        let _guard = self.lock.lock();

        let mut cards = self.read()?;
        let before = cards.len();
        cards.retain(|c| c.id != id);
        if cards.len() == before {
            return Ok(false);
        }

        self.write(&cards)?;
        info!(card = %id, "Card deleted");
        Ok(true)
    }
}
