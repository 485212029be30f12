//! # Indicator Core
//!
//! Shared logic for Indicator Store: data models, the error type, the
//! store abstraction, remote payload normalization, and the query engine.
//!
//! This crate contains no tokio, sqlx, reqwest, or other I/O
//! dependencies. Backends (SQLite, HTTP) live in the `indicator-store`
//! crate and plug in through the [`store::Store`] and
//! [`remote::IndicatorSource`] traits.

pub mod error;
pub mod models;
pub mod params;
pub mod query;
pub mod remote;
pub mod store;

pub use error::{Error, Result};
