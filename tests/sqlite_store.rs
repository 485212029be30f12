//! Integration tests for the SQLite-backed store against an on-disk database.

use indicator_core::models::{Entry, OrderField, OrderKey, SortDirection};
use indicator_core::store::Store;
use indicator_core::Error;
use indicator_store::config::Config;
use indicator_store::sqlite_store::SqliteStore;
use indicator_store::{db, migrate, open_store};
use tempfile::TempDir;

const GDP: &str = "NY.GDP.MKTP.CD";

fn test_config(tmp: &TempDir) -> Config {
    let db_path = tmp.path().join("data").join("indicators.sqlite");
    let config_content = format!(
        r#"
[db]
path = "{}"

[server]
bind = "127.0.0.1:0"
"#,
        db_path.display()
    );
    toml::from_str(&config_content).unwrap()
}

async fn test_store(tmp: &TempDir) -> SqliteStore {
    open_store(&test_config(tmp)).await.unwrap()
}

fn gdp(country: &str, date: &str, value: f64) -> Entry {
    Entry::new(GDP, country, date, value)
}

#[tokio::test]
async fn test_create_then_find_by_indicator_and_id() {
    let tmp = TempDir::new().unwrap();
    let store = test_store(&tmp).await;

    let created = store
        .create_collection(GDP, "GDP (current US$)")
        .await
        .unwrap();

    let by_indicator = store.find_collection_by_indicator(GDP).await.unwrap().unwrap();
    let by_id = store.find_collection_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(by_indicator, created);
    assert_eq!(by_id, created);

    assert!(store.find_collection_by_indicator("nope").await.unwrap().is_none());
    assert!(store.find_collection_by_id(created.id + 1).await.unwrap().is_none());
}

#[tokio::test]
async fn test_schema_creation_is_idempotent_and_data_survives_reopen() {
    let tmp = TempDir::new().unwrap();
    let config = test_config(&tmp);

    let store = open_store(&config).await.unwrap();
    let created = store.create_collection(GDP, "GDP").await.unwrap();
    store.close().await;

    let reopened = open_store(&config).await.unwrap();
    let found = reopened.find_collection_by_id(created.id).await.unwrap();
    assert_eq!(found, Some(created));
}

#[tokio::test]
async fn test_ids_are_monotonic_across_deletes() {
    let tmp = TempDir::new().unwrap();
    let store = test_store(&tmp).await;

    let a = store.create_collection("A", "a").await.unwrap();
    let b = store.create_collection("B", "b").await.unwrap();
    assert!(store.delete_collection(b.id).await.unwrap());
    let c = store.create_collection("C", "c").await.unwrap();

    assert!(a.id < b.id);
    assert!(b.id < c.id);
}

#[tokio::test]
async fn test_list_collections_ordering() {
    let tmp = TempDir::new().unwrap();
    let store = test_store(&tmp).await;

    for (ind, label) in [("B.IND", "same"), ("C.IND", "other"), ("A.IND", "same")] {
        store.create_collection(ind, label).await.unwrap();
    }

    let default: Vec<String> = store
        .list_collections(&[])
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.indicator_id)
        .collect();
    assert_eq!(default, vec!["B.IND", "C.IND", "A.IND"]);

    let desc: Vec<String> = store
        .list_collections(&[OrderKey::new(OrderField::Indicator, SortDirection::Descending)])
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.indicator_id)
        .collect();
    assert_eq!(desc, vec!["C.IND", "B.IND", "A.IND"]);

    let multi: Vec<String> = store
        .list_collections(&[
            OrderKey::new(OrderField::IndicatorValue, SortDirection::Ascending),
            OrderKey::new(OrderField::Indicator, SortDirection::Ascending),
        ])
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.indicator_id)
        .collect();
    assert_eq!(multi, vec!["C.IND", "A.IND", "B.IND"]);
}

#[tokio::test]
async fn test_insert_entries_batch_rolls_back_on_failure() {
    let tmp = TempDir::new().unwrap();
    let store = test_store(&tmp).await;

    store.insert_entries(&[gdp("Chile", "2015", 1.0)]).await.unwrap();

    // Second row collides with the stored one; the first must not persist.
    let err = store
        .insert_entries(&[gdp("Peru", "2015", 2.0), gdp("Chile", "2015", 3.0)])
        .await
        .unwrap_err();
    assert!(matches!(err, Error::AlreadyExists(_)));

    let stored = store.find_entries_by_indicator(GDP).await.unwrap();
    assert_eq!(stored, vec![gdp("Chile", "2015", 1.0)]);
}

#[tokio::test]
async fn test_import_collection_is_atomic() {
    let tmp = TempDir::new().unwrap();
    let store = test_store(&tmp).await;

    let dup = [gdp("Chile", "2015", 1.0), gdp("Chile", "2015", 1.0)];
    assert!(store.import_collection(GDP, "GDP", &dup).await.is_err());

    assert!(store.find_collection_by_indicator(GDP).await.unwrap().is_none());
    assert!(store.find_entries_by_indicator(GDP).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_duplicate_indicator_is_already_exists() {
    let tmp = TempDir::new().unwrap();
    let store = test_store(&tmp).await;

    store.create_collection(GDP, "GDP").await.unwrap();
    let err = store.create_collection(GDP, "GDP").await.unwrap_err();
    assert!(matches!(err, Error::AlreadyExists(_)));
}

#[tokio::test]
async fn test_find_entry_and_sorted_entries() {
    let tmp = TempDir::new().unwrap();
    let store = test_store(&tmp).await;

    store
        .import_collection(
            GDP,
            "GDP",
            &[
                gdp("A", "2016", 10.0),
                gdp("B", "2016", 30.0),
                gdp("C", "2016", 20.0),
                gdp("D", "2016", 5.0),
                gdp("A", "2015", 7.25),
            ],
        )
        .await
        .unwrap();

    let entry = store.find_entry(GDP, "2015", "A").await.unwrap();
    assert_eq!(entry, Some(gdp("A", "2015", 7.25)));
    assert!(store.find_entry(GDP, "2015", "B").await.unwrap().is_none());

    let top: Vec<String> = store
        .find_entries_sorted(GDP, "2016", SortDirection::Descending, Some(3))
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.country)
        .collect();
    assert_eq!(top, vec!["B", "C", "A"]);

    let bottom: Vec<String> = store
        .find_entries_sorted(GDP, "2016", SortDirection::Ascending, Some(3))
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.country)
        .collect();
    assert_eq!(bottom, vec!["D", "A", "C"]);

    let all = store
        .find_entries_sorted(GDP, "2016", SortDirection::Ascending, None)
        .await
        .unwrap();
    assert_eq!(all.len(), 4);
}

#[tokio::test]
async fn test_delete_cascades_to_entries() {
    let tmp = TempDir::new().unwrap();
    let store = test_store(&tmp).await;

    let gdp_collection = store
        .import_collection(GDP, "GDP", &[gdp("A", "2016", 1.0), gdp("B", "2016", 2.0)])
        .await
        .unwrap();
    store
        .import_collection("SP.POP.TOTL", "Population", &[Entry::new("SP.POP.TOTL", "A", "2016", 9.0)])
        .await
        .unwrap();

    assert!(store.delete_collection(gdp_collection.id).await.unwrap());
    assert!(store.find_collection_by_id(gdp_collection.id).await.unwrap().is_none());
    assert!(store.find_entries_by_indicator(GDP).await.unwrap().is_empty());

    // Other collections are untouched.
    assert_eq!(store.find_entries_by_indicator("SP.POP.TOTL").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_delete_missing_returns_false_and_mutates_nothing() {
    let tmp = TempDir::new().unwrap();
    let store = test_store(&tmp).await;

    let kept = store
        .import_collection(GDP, "GDP", &[gdp("A", "2016", 1.0)])
        .await
        .unwrap();

    assert!(!store.delete_collection(kept.id + 42).await.unwrap());
    assert_eq!(store.list_collections(&[]).await.unwrap(), vec![kept]);
    assert_eq!(store.find_entries_by_indicator(GDP).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_drop_schema_removes_tables() {
    let tmp = TempDir::new().unwrap();
    let config = test_config(&tmp);
    let store = open_store(&config).await.unwrap();
    store.create_collection(GDP, "GDP").await.unwrap();
    store.close().await;

    let pool = db::connect(&config).await.unwrap();
    migrate::drop_schema(&pool).await.unwrap();
    let tables: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name IN ('collections', 'entries')",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(tables, 0);
    pool.close().await;
}
