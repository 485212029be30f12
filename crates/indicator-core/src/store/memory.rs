//! In-memory [`Store`] implementation for tests and embedding.
//!
//! All state sits behind a single `std::sync::RwLock`, so every operation
//! (including [`Store::import_collection`]) is atomic with respect to the
//! others. Uniqueness of indicator ids and of `(indicator, country, date)`
//! is enforced the same way the SQLite schema enforces it.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;

use crate::error::{Error, Result};
use crate::models::{Collection, Entry, OrderField, OrderKey, SortDirection};

use super::Store;

#[derive(Default)]
struct State {
    next_id: i64,
    collections: Vec<Collection>,
    entries: Vec<Entry>,
}

impl State {
    fn insert_collection(&mut self, indicator_id: &str, indicator_value: &str) -> Result<Collection> {
        if self.collections.iter().any(|c| c.indicator_id == indicator_id) {
            return Err(Error::already_imported(indicator_id));
        }
        self.next_id += 1;
        let collection = Collection {
            id: self.next_id,
            creation_time: Utc::now(),
            indicator_id: indicator_id.to_string(),
            indicator_value: indicator_value.to_string(),
        };
        self.collections.push(collection.clone());
        Ok(collection)
    }

    fn check_entries(&self, entries: &[Entry]) -> Result<()> {
        let mut seen: HashSet<(&str, &str, &str)> = self
            .entries
            .iter()
            .map(|e| (e.indicator_id.as_str(), e.country.as_str(), e.date.as_str()))
            .collect();
        for e in entries {
            if !seen.insert((e.indicator_id.as_str(), e.country.as_str(), e.date.as_str())) {
                return Err(Error::AlreadyExists(format!(
                    "duplicate entry for indicator {} country {} date {}",
                    e.indicator_id, e.country, e.date
                )));
            }
        }
        Ok(())
    }
}

/// In-memory store. Ids start at 1 and are never reused.
pub struct InMemoryStore {
    state: RwLock<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State::default()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>> {
        self.state
            .read()
            .map_err(|_| Error::Storage("in-memory store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>> {
        self.state
            .write()
            .map_err(|_| Error::Storage("in-memory store lock poisoned".to_string()))
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn compare_by(a: &Collection, b: &Collection, key: &OrderKey) -> Ordering {
    let ord = match key.field {
        OrderField::Id => a.id.cmp(&b.id),
        OrderField::CreationTime => a.creation_time.cmp(&b.creation_time),
        OrderField::Indicator => a.indicator_id.cmp(&b.indicator_id),
        OrderField::IndicatorValue => a.indicator_value.cmp(&b.indicator_value),
    };
    match key.direction {
        SortDirection::Ascending => ord,
        SortDirection::Descending => ord.reverse(),
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn create_collection(
        &self,
        indicator_id: &str,
        indicator_value: &str,
    ) -> Result<Collection> {
        self.write()?.insert_collection(indicator_id, indicator_value)
    }

    async fn find_collection_by_indicator(&self, indicator_id: &str) -> Result<Option<Collection>> {
        Ok(self
            .read()?
            .collections
            .iter()
            .find(|c| c.indicator_id == indicator_id)
            .cloned())
    }

    async fn find_collection_by_id(&self, id: i64) -> Result<Option<Collection>> {
        Ok(self.read()?.collections.iter().find(|c| c.id == id).cloned())
    }

    async fn list_collections(&self, order: &[OrderKey]) -> Result<Vec<Collection>> {
        let mut collections = self.read()?.collections.clone();
        collections.sort_by(|a, b| {
            order
                .iter()
                .map(|key| compare_by(a, b, key))
                .find(|ord| ord.is_ne())
                .unwrap_or_else(|| a.id.cmp(&b.id))
        });
        Ok(collections)
    }

    async fn insert_entries(&self, entries: &[Entry]) -> Result<()> {
        let mut state = self.write()?;
        state.check_entries(entries)?;
        state.entries.extend_from_slice(entries);
        Ok(())
    }

    async fn find_entries_by_indicator(&self, indicator_id: &str) -> Result<Vec<Entry>> {
        Ok(self
            .read()?
            .entries
            .iter()
            .filter(|e| e.indicator_id == indicator_id)
            .cloned()
            .collect())
    }

    async fn find_entry(
        &self,
        indicator_id: &str,
        date: &str,
        country: &str,
    ) -> Result<Option<Entry>> {
        Ok(self
            .read()?
            .entries
            .iter()
            .find(|e| e.indicator_id == indicator_id && e.date == date && e.country == country)
            .cloned())
    }

    async fn find_entries_sorted(
        &self,
        indicator_id: &str,
        date: &str,
        direction: SortDirection,
        limit: Option<u32>,
    ) -> Result<Vec<Entry>> {
        let mut entries: Vec<Entry> = self
            .read()?
            .entries
            .iter()
            .filter(|e| e.indicator_id == indicator_id && e.date == date)
            .cloned()
            .collect();

        entries.sort_by(|a, b| {
            let by_value = match direction {
                SortDirection::Ascending => a.value.total_cmp(&b.value),
                SortDirection::Descending => b.value.total_cmp(&a.value),
            };
            by_value.then_with(|| a.country.cmp(&b.country))
        });

        if let Some(limit) = limit {
            entries.truncate(limit as usize);
        }
        Ok(entries)
    }

    async fn delete_collection(&self, id: i64) -> Result<bool> {
        let mut state = self.write()?;
        let Some(pos) = state.collections.iter().position(|c| c.id == id) else {
            return Ok(false);
        };
        let removed = state.collections.remove(pos);
        state.entries.retain(|e| e.indicator_id != removed.indicator_id);
        Ok(true)
    }

    async fn import_collection(
        &self,
        indicator_id: &str,
        indicator_value: &str,
        entries: &[Entry],
    ) -> Result<Collection> {
        let mut state = self.write()?;
        state.check_entries(entries)?;
        let collection = state.insert_collection(indicator_id, indicator_value)?;
        state.entries.extend_from_slice(entries);
        Ok(collection)
    }
}
