//! CLI command implementations.
//!
//! Each command calls the same core operation as its HTTP endpoint and
//! prints the result to stdout.

use anyhow::Result;

use indicator_core::params::{parse_order_spec, TopQuery};
use indicator_core::query;
use indicator_core::remote::IndicatorSource;
use indicator_core::store::Store;
use indicator_core::Error;

use crate::import::import_collection;

pub async fn run_import(
    store: &dyn Store,
    source: &dyn IndicatorSource,
    indicator_id: &str,
) -> Result<()> {
    let collection = import_collection(store, source, indicator_id).await?;
    let entries = store
        .find_entries_by_indicator(&collection.indicator_id)
        .await?
        .len();

    println!("Collection added successfully!");
    println!("  id:            {}", collection.id);
    println!("  uri:           {}", collection.uri());
    println!("  indicator:     {}", collection.indicator_id);
    println!("  label:         {}", collection.indicator_value);
    println!("  creation_time: {}", collection.creation_time.to_rfc3339());
    println!("  entries:       {}", entries);
    Ok(())
}

pub async fn run_list(store: &dyn Store, order_by: Option<&str>) -> Result<()> {
    let order = parse_order_spec(order_by)?;
    let summaries = query::get_ordered_collection_summaries(store, &order).await?;

    if summaries.is_empty() {
        println!("No collections imported.");
        return Ok(());
    }

    println!("{:>6}  {:<28} {:<34} {}", "ID", "INDICATOR", "CREATED", "URI");
    println!("{}", "-".repeat(88));
    for s in &summaries {
        println!(
            "{:>6}  {:<28} {:<34} {}",
            s.id,
            s.indicator,
            s.creation_time.to_rfc3339(),
            s.uri
        );
    }
    Ok(())
}

pub async fn run_get(store: &dyn Store, id: i64) -> Result<()> {
    let detail = query::get_collection_detail(store, id).await?;

    println!("--- Collection {} ---", detail.id);
    println!("indicator:     {}", detail.indicator);
    println!("label:         {}", detail.indicator_value);
    println!("creation_time: {}", detail.creation_time.to_rfc3339());
    println!();
    println!("--- Entries ({}) ---", detail.entries.len());
    for e in &detail.entries {
        println!("{:<40} {:<6} {}", e.country, e.date, e.value);
    }
    Ok(())
}

pub async fn run_entry(store: &dyn Store, id: i64, year: &str, country: &str) -> Result<()> {
    let entry = query::get_entry(store, id, year, country).await?;
    println!(
        "{} / {} / {}: {}",
        entry.indicator, entry.country, entry.year, entry.value
    );
    Ok(())
}

pub async fn run_top(store: &dyn Store, id: i64, year: &str, q: Option<&str>) -> Result<()> {
    let top = TopQuery::parse(q)?;
    let ranked = query::get_top_or_bottom_entries(store, id, year, top.count, top.direction).await?;

    println!("{} ({}), {}", ranked.indicator_value, ranked.indicator, year);
    for (rank, e) in ranked.entries.iter().enumerate() {
        println!("{:>4}. {:<40} {}", rank + 1, e.country, e.value);
    }
    Ok(())
}

pub async fn run_delete(store: &dyn Store, id: i64) -> Result<()> {
    if !store.delete_collection(id).await? {
        return Err(Error::collection_not_found(id).into());
    }
    println!("The collection {} was removed from the database!", id);
    Ok(())
}
