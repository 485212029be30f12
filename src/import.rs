//! Collection import pipeline: pre-check → remote fetch → persist.
//!
//! An indicator is fetched at most once. If it is already stored the
//! import fails with [`Error::AlreadyExists`] before any network traffic,
//! and a failed fetch leaves the store untouched.

use tracing::info;

use indicator_core::models::Collection;
use indicator_core::remote::IndicatorSource;
use indicator_core::store::Store;
use indicator_core::{Error, Result};

pub async fn import_collection(
    store: &dyn Store,
    source: &dyn IndicatorSource,
    indicator_id: &str,
) -> Result<Collection> {
    let indicator_id = indicator_id.trim();
    if indicator_id.is_empty() {
        return Err(Error::InvalidArgument(
            "indicator_id not present in the request args".to_string(),
        ));
    }

    if store.find_collection_by_indicator(indicator_id).await?.is_some() {
        return Err(Error::already_imported(indicator_id));
    }

    info!(indicator_id, "fetching indicator from remote API");
    let dataset = source.fetch(indicator_id).await?;

    // The API may report a canonical id that differs from the requested one.
    if dataset.meta.id != indicator_id
        && store
            .find_collection_by_indicator(&dataset.meta.id)
            .await?
            .is_some()
    {
        return Err(Error::already_imported(&dataset.meta.id));
    }

    let collection = store
        .import_collection(&dataset.meta.id, &dataset.meta.value, &dataset.entries)
        .await?;

    info!(
        id = collection.id,
        indicator_id = %collection.indicator_id,
        entries = dataset.entries.len(),
        "collection imported"
    );
    Ok(collection)
}
