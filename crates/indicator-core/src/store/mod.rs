//! Storage abstraction for Indicator Store.
//!
//! The [`Store`] trait defines every persistence operation the import
//! pipeline and the query engine need, enabling pluggable backends
//! (SQLite in the application crate, in-memory here).
//!
//! Implementations must be `Send + Sync` to be shared across request
//! handlers. Stores perform no business validation: duplicate-import
//! checks and not-found reporting belong to the callers.

pub mod memory;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Collection, Entry, OrderKey, SortDirection};

/// Abstract storage backend for collections and their entries.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`create_collection`](Store::create_collection) | Insert a collection row with a fresh id and timestamp |
/// | [`find_collection_by_indicator`](Store::find_collection_by_indicator) | Look up a collection by indicator id |
/// | [`find_collection_by_id`](Store::find_collection_by_id) | Look up a collection by numeric id |
/// | [`list_collections`](Store::list_collections) | All collections, multi-key ordered |
/// | [`insert_entries`](Store::insert_entries) | Bulk insert, all-or-nothing |
/// | [`find_entries_by_indicator`](Store::find_entries_by_indicator) | Every entry of one indicator |
/// | [`find_entry`](Store::find_entry) | One entry by (indicator, date, country) |
/// | [`find_entries_sorted`](Store::find_entries_sorted) | Entries of one year sorted by value |
/// | [`delete_collection`](Store::delete_collection) | Remove a collection and its entries |
/// | [`import_collection`](Store::import_collection) | Create a collection together with its entries |
#[async_trait]
pub trait Store: Send + Sync {
    /// Insert a new collection. The store assigns a monotonically
    /// increasing id and the current UTC time.
    async fn create_collection(&self, indicator_id: &str, indicator_value: &str)
        -> Result<Collection>;

    async fn find_collection_by_indicator(&self, indicator_id: &str) -> Result<Option<Collection>>;

    async fn find_collection_by_id(&self, id: i64) -> Result<Option<Collection>>;

    /// List collections sorted by `order` (first key primary). An empty
    /// slice yields the storage default, which is ascending id.
    async fn list_collections(&self, order: &[OrderKey]) -> Result<Vec<Collection>>;

    /// Insert a batch of entries. Either every entry is stored or none is.
    async fn insert_entries(&self, entries: &[Entry]) -> Result<()>;

    async fn find_entries_by_indicator(&self, indicator_id: &str) -> Result<Vec<Entry>>;

    async fn find_entry(
        &self,
        indicator_id: &str,
        date: &str,
        country: &str,
    ) -> Result<Option<Entry>>;

    /// Entries for `indicator_id` in year `date`, ordered by value in
    /// `direction` (ties by country ascending) and capped at `limit`.
    async fn find_entries_sorted(
        &self,
        indicator_id: &str,
        date: &str,
        direction: SortDirection,
        limit: Option<u32>,
    ) -> Result<Vec<Entry>>;

    /// Delete a collection and every entry sharing its indicator id.
    ///
    /// Returns `false`, without touching anything, when `id` is unknown.
    async fn delete_collection(&self, id: i64) -> Result<bool>;

    /// Create a collection and store its entries.
    ///
    /// The default runs [`create_collection`](Store::create_collection)
    /// followed by [`insert_entries`](Store::insert_entries); backends with
    /// transactions override it to make the pair atomic.
    async fn import_collection(
        &self,
        indicator_id: &str,
        indicator_value: &str,
        entries: &[Entry],
    ) -> Result<Collection> {
        let collection = self.create_collection(indicator_id, indicator_value).await?;
        self.insert_entries(entries).await?;
        Ok(collection)
    }
}
