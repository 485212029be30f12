//! Error type shared by the store, the remote fetcher, and the query engine.
//!
//! Every variant's `Display` output is the human-readable message handed
//! back to API clients, so messages are phrased for end users.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// A collection or entry is absent.
    #[error("{0}")]
    NotFound(String),

    /// An indicator has already been imported.
    #[error("{0}")]
    AlreadyExists(String),

    /// The remote API answered with a non-success status.
    #[error("GET on {url} returned response code: {status}")]
    RemoteFetch { status: u16, url: String },

    /// The remote API could not be reached (connect error, timeout, bad body).
    #[error("GET on {url} failed: {message}")]
    Network { url: String, message: String },

    /// The remote API rejected the indicator id.
    #[error("{0}")]
    InvalidIndicator(String),

    /// The remote payload did not have the expected shape.
    #[error("malformed remote data: {0}")]
    MalformedRemoteData(String),

    /// Underlying persistence failure.
    #[error("storage error: {0}")]
    Storage(String),

    /// A request parameter could not be interpreted.
    #[error("{0}")]
    InvalidArgument(String),
}

impl Error {
    pub fn collection_not_found(id: i64) -> Self {
        Error::NotFound(format!("collection doesn't exist with id: {}", id))
    }

    pub fn already_imported(indicator_id: &str) -> Self {
        Error::AlreadyExists(format!(
            "indicator_id {} already imported in collections",
            indicator_id
        ))
    }

    /// True for both remote failure kinds (bad status and transport fault).
    pub fn is_remote_fetch_failure(&self) -> bool {
        matches!(self, Error::RemoteFetch { .. } | Error::Network { .. })
    }
}
