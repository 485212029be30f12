//! SQLite-backed [`Store`] implementation.
//!
//! Every multi-statement write (entry batches, imports, deletes) runs in a
//! single transaction. Orderings are assembled only from the static column
//! names of [`OrderField`] and the `ASC`/`DESC` keywords of
//! [`SortDirection`]; all values are bound parameters.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};

use indicator_core::models::{Collection, Entry, OrderField, OrderKey, SortDirection};
use indicator_core::store::Store;
use indicator_core::{Error, Result};

/// SQLite implementation of the [`Store`] trait.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close every pooled connection. Further calls fail with a storage error.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Map a driver error onto the store's error type. Uniqueness violations
/// mean the row is already present.
fn db_err(e: sqlx::Error) -> Error {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            return Error::AlreadyExists(format!("record already exists: {}", db.message()));
        }
    }
    Error::Storage(e.to_string())
}

fn row_to_collection(row: &SqliteRow) -> Result<Collection> {
    let creation_time: String = row.try_get("creation_time").map_err(db_err)?;
    Ok(Collection {
        id: row.try_get("id").map_err(db_err)?,
        creation_time: parse_ts(&creation_time)?,
        indicator_id: row.try_get("indicator_id").map_err(db_err)?,
        indicator_value: row.try_get("indicator_value").map_err(db_err)?,
    })
}

fn row_to_entry(row: &SqliteRow) -> Result<Entry> {
    Ok(Entry {
        indicator_id: row.try_get("indicator_id").map_err(db_err)?,
        country: row.try_get("country").map_err(db_err)?,
        date: row.try_get("date").map_err(db_err)?,
        value: row.try_get("value").map_err(db_err)?,
    })
}

fn parse_ts(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Storage(format!("bad creation_time '{}': {}", s, e)))
}

/// Build the ORDER BY clause for a collection listing. Ascending id is
/// always the last key so equal rows keep insertion order.
fn order_clause(order: &[OrderKey]) -> String {
    let mut parts: Vec<String> = order
        .iter()
        .map(|key| format!("{} {}", key.field.column(), key.direction.as_sql()))
        .collect();
    if !order.iter().any(|key| key.field == OrderField::Id) {
        parts.push("id ASC".to_string());
    }
    format!("ORDER BY {}", parts.join(", "))
}

async fn insert_collection_row(
    conn: &mut SqliteConnection,
    indicator_id: &str,
    indicator_value: &str,
) -> Result<Collection> {
    // Fixed-width UTC text sorts chronologically.
    let creation_time = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);

    let result = sqlx::query(
        "INSERT INTO collections (creation_time, indicator_id, indicator_value) VALUES (?, ?, ?)",
    )
    .bind(&creation_time)
    .bind(indicator_id)
    .bind(indicator_value)
    .execute(&mut *conn)
    .await
    .map_err(db_err)?;

    Ok(Collection {
        id: result.last_insert_rowid(),
        creation_time: parse_ts(&creation_time)?,
        indicator_id: indicator_id.to_string(),
        indicator_value: indicator_value.to_string(),
    })
}

async fn insert_entry_rows(conn: &mut SqliteConnection, entries: &[Entry]) -> Result<()> {
    for entry in entries {
        sqlx::query("INSERT INTO entries (indicator_id, country, date, value) VALUES (?, ?, ?, ?)")
            .bind(&entry.indicator_id)
            .bind(&entry.country)
            .bind(&entry.date)
            .bind(entry.value)
            .execute(&mut *conn)
            .await
            .map_err(db_err)?;
    }
    Ok(())
}

#[async_trait]
impl Store for SqliteStore {
    async fn create_collection(
        &self,
        indicator_id: &str,
        indicator_value: &str,
    ) -> Result<Collection> {
        let mut conn = self.pool.acquire().await.map_err(db_err)?;
        insert_collection_row(&mut *conn, indicator_id, indicator_value).await
    }

    async fn find_collection_by_indicator(&self, indicator_id: &str) -> Result<Option<Collection>> {
        let row = sqlx::query(
            "SELECT id, creation_time, indicator_id, indicator_value FROM collections WHERE indicator_id = ?",
        )
        .bind(indicator_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.as_ref().map(row_to_collection).transpose()
    }

    async fn find_collection_by_id(&self, id: i64) -> Result<Option<Collection>> {
        let row = sqlx::query(
            "SELECT id, creation_time, indicator_id, indicator_value FROM collections WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.as_ref().map(row_to_collection).transpose()
    }

    async fn list_collections(&self, order: &[OrderKey]) -> Result<Vec<Collection>> {
        let sql = format!(
            "SELECT id, creation_time, indicator_id, indicator_value FROM collections {}",
            order_clause(order)
        );
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        rows.iter().map(row_to_collection).collect()
    }

    async fn insert_entries(&self, entries: &[Entry]) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        insert_entry_rows(&mut *tx, entries).await?;
        tx.commit().await.map_err(db_err)?;
        Ok(())
    }

    async fn find_entries_by_indicator(&self, indicator_id: &str) -> Result<Vec<Entry>> {
        let rows = sqlx::query(
            "SELECT indicator_id, country, date, value FROM entries WHERE indicator_id = ? ORDER BY rowid ASC",
        )
        .bind(indicator_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.iter().map(row_to_entry).collect()
    }

    async fn find_entry(
        &self,
        indicator_id: &str,
        date: &str,
        country: &str,
    ) -> Result<Option<Entry>> {
        let row = sqlx::query(
            "SELECT indicator_id, country, date, value FROM entries WHERE indicator_id = ? AND date = ? AND country = ?",
        )
        .bind(indicator_id)
        .bind(date)
        .bind(country)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.as_ref().map(row_to_entry).transpose()
    }

    async fn find_entries_sorted(
        &self,
        indicator_id: &str,
        date: &str,
        direction: SortDirection,
        limit: Option<u32>,
    ) -> Result<Vec<Entry>> {
        let sql = format!(
            "SELECT indicator_id, country, date, value FROM entries \
             WHERE indicator_id = ? AND date = ? \
             ORDER BY value {}, country ASC LIMIT ?",
            direction.as_sql()
        );
        // SQLite treats a negative LIMIT as "no limit".
        let limit = limit.map(i64::from).unwrap_or(-1);

        let rows = sqlx::query(&sql)
            .bind(indicator_id)
            .bind(date)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        rows.iter().map(row_to_entry).collect()
    }

    async fn delete_collection(&self, id: i64) -> Result<bool> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let indicator_id: Option<String> =
            sqlx::query_scalar("SELECT indicator_id FROM collections WHERE id = ?")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(db_err)?;

        let Some(indicator_id) = indicator_id else {
            return Ok(false);
        };

        sqlx::query("DELETE FROM collections WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        sqlx::query("DELETE FROM entries WHERE indicator_id = ?")
            .bind(&indicator_id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;
        Ok(true)
    }

    async fn import_collection(
        &self,
        indicator_id: &str,
        indicator_value: &str,
        entries: &[Entry],
    ) -> Result<Collection> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        let collection = insert_collection_row(&mut *tx, indicator_id, indicator_value).await?;
        insert_entry_rows(&mut *tx, entries).await?;
        tx.commit().await.map_err(db_err)?;
        Ok(collection)
    }
}
