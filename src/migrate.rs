//! Schema setup and teardown.
//!
//! Two tables: `collections` (one row per imported indicator) and
//! `entries` (one row per country/year observation). `create_schema` is
//! idempotent; `drop_schema` removes both tables and their data.

use anyhow::Result;
use sqlx::SqlitePool;

pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    // AUTOINCREMENT keeps ids monotonic even after deletes.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS collections (
            id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
            creation_time TEXT NOT NULL,
            indicator_id TEXT NOT NULL UNIQUE,
            indicator_value TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS entries (
            indicator_id TEXT NOT NULL,
            country TEXT NOT NULL,
            date TEXT NOT NULL,
            value REAL NOT NULL,
            UNIQUE(indicator_id, country, date)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_entries_indicator_date ON entries(indicator_id, date)")
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn drop_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query("DROP TABLE IF EXISTS entries")
        .execute(pool)
        .await?;
    sqlx::query("DROP TABLE IF EXISTS collections")
        .execute(pool)
        .await?;
    Ok(())
}
