//! # Indicator Store
//!
//! A local cache and REST facade for remote statistical indicator data.
//!
//! An indicator (for example `SP.POP.TOTL`) is imported once from the
//! remote statistics API, flattened into country/year/value entries, and
//! stored in SQLite. After that every query (listing, full collection,
//! single entry, top/bottom-N) is answered locally.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌───────────┐
//! │  Remote API  │──▶│    Import    │──▶│  SQLite   │
//! │ (paged JSON) │   │ fetch+flatten│   │ 2 tables  │
//! └──────────────┘   └──────────────┘   └─────┬─────┘
//!                                             │
//!                          ┌──────────────────┤
//!                          ▼                  ▼
//!                   ┌─────────────┐     ┌──────────┐
//!                   │     CLI     │     │   HTTP   │
//!                   │ (indicator) │     │  (REST)  │
//!                   └─────────────┘     └──────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing and validation |
//! | [`db`] | SQLite connection pool with WAL mode |
//! | [`migrate`] | Schema creation and teardown |
//! | [`sqlite_store`] | SQLite implementation of the `Store` trait |
//! | [`fetcher`] | HTTP client for the remote API, with pagination |
//! | [`import`] | Import pipeline: pre-check → fetch → persist |
//! | [`server`] | REST API (Axum) with CORS |
//! | [`commands`] | CLI command implementations |
//!
//! Models, the `Store` trait, payload decoding, and the query engine live
//! in the `indicator-core` crate, re-exported here as [`indicator_core`].

pub mod commands;
pub mod config;
pub mod db;
pub mod fetcher;
pub mod import;
pub mod migrate;
pub mod server;
pub mod sqlite_store;

pub use indicator_core;

use anyhow::Result;

use crate::config::Config;
use crate::sqlite_store::SqliteStore;

/// Connect to the configured database and make sure the schema exists.
pub async fn open_store(config: &Config) -> Result<SqliteStore> {
    let pool = db::connect(config).await?;
    migrate::create_schema(&pool).await?;
    Ok(SqliteStore::new(pool))
}
