//! Read-side query engine.
//!
//! Shapes [`Store`] results into the JSON response contracts served by the
//! HTTP API and printed by the CLI. Nothing here mutates the store.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::models::{Collection, OrderKey, SortDirection};
use crate::store::Store;

/// Full collection with all of its entries.
#[derive(Debug, Clone, Serialize)]
pub struct CollectionDetail {
    pub id: i64,
    pub indicator: String,
    pub indicator_value: String,
    pub creation_time: DateTime<Utc>,
    pub entries: Vec<EntryItem>,
}

/// An entry inside a [`CollectionDetail`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryItem {
    pub country: String,
    pub date: String,
    pub value: f64,
}

/// Listing row for `GET /collections`.
#[derive(Debug, Clone, Serialize)]
pub struct CollectionSummary {
    pub uri: String,
    pub id: i64,
    pub creation_time: DateTime<Utc>,
    pub indicator: String,
}

impl From<&Collection> for CollectionSummary {
    fn from(c: &Collection) -> Self {
        Self {
            uri: c.uri(),
            id: c.id,
            creation_time: c.creation_time,
            indicator: c.indicator_id.clone(),
        }
    }
}

/// A single country/year value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryResponse {
    pub id: i64,
    pub indicator: String,
    pub country: String,
    pub year: String,
    pub value: f64,
}

/// Result of a top/bottom-N query.
#[derive(Debug, Clone, Serialize)]
pub struct RankedEntries {
    pub indicator: String,
    pub indicator_value: String,
    pub entries: Vec<RankedItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedItem {
    pub country: String,
    pub value: f64,
}

async fn require_collection(store: &dyn Store, id: i64) -> Result<Collection> {
    store
        .find_collection_by_id(id)
        .await?
        .ok_or_else(|| Error::collection_not_found(id))
}

/// Collection fields plus every stored entry.
pub async fn get_collection_detail(store: &dyn Store, id: i64) -> Result<CollectionDetail> {
    let collection = require_collection(store, id).await?;
    let entries = store
        .find_entries_by_indicator(&collection.indicator_id)
        .await?
        .into_iter()
        .map(|e| EntryItem {
            country: e.country,
            date: e.date,
            value: e.value,
        })
        .collect();

    Ok(CollectionDetail {
        id: collection.id,
        indicator: collection.indicator_id,
        indicator_value: collection.indicator_value,
        creation_time: collection.creation_time,
        entries,
    })
}

pub async fn get_ordered_collection_summaries(
    store: &dyn Store,
    order: &[OrderKey],
) -> Result<Vec<CollectionSummary>> {
    let collections = store.list_collections(order).await?;
    Ok(collections.iter().map(CollectionSummary::from).collect())
}

/// Resolve the collection, then the entry for `(year, country)` in it.
pub async fn get_entry(
    store: &dyn Store,
    id: i64,
    year: &str,
    country: &str,
) -> Result<EntryResponse> {
    let collection = require_collection(store, id).await?;
    let entry = store
        .find_entry(&collection.indicator_id, year, country)
        .await?
        .ok_or_else(|| {
            Error::NotFound(format!(
                "Entry doesn't exist in Collection(id={}, indicator={}) with year={} and country={}",
                id, collection.indicator_id, year, country
            ))
        })?;

    Ok(EntryResponse {
        id,
        indicator: collection.indicator_id,
        country: entry.country,
        year: entry.date,
        value: entry.value,
    })
}

/// Highest or lowest `count` entries of a year (all when `count` is `None`).
///
/// Results are always displayed highest first: an ascending query takes
/// the `count` lowest values and then reverses them, so a bottom-3 over
/// `{A:10, B:30, C:20, D:5}` returns `[C:20, A:10, D:5]`.
pub async fn get_top_or_bottom_entries(
    store: &dyn Store,
    id: i64,
    year: &str,
    count: Option<u32>,
    direction: SortDirection,
) -> Result<RankedEntries> {
    let collection = require_collection(store, id).await?;
    let mut entries = store
        .find_entries_sorted(&collection.indicator_id, year, direction, count)
        .await?;

    if direction == SortDirection::Ascending {
        entries.reverse();
    }

    Ok(RankedEntries {
        indicator: collection.indicator_id,
        indicator_value: collection.indicator_value,
        entries: entries
            .into_iter()
            .map(|e| RankedItem {
                country: e.country,
                value: e.value,
            })
            .collect(),
    })
}
