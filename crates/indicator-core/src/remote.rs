//! Remote indicator data: the [`IndicatorSource`] trait and the pure
//! decoding of the statistics API's paged JSON payload.
//!
//! The API answers `GET .../indicators/<id>?format=json` with a two-element
//! array `[pageInfo, dataRows]`. A one-element array carries the API's own
//! error message (for example an unknown indicator id). Decoding lives here
//! so it can be tested without a network; the HTTP client that drives
//! pagination is in the application crate.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::models::{Entry, IndicatorMeta};

/// A fully fetched and normalized indicator.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorDataset {
    pub meta: IndicatorMeta,
    pub entries: Vec<Entry>,
}

/// Anything that can produce the full time-series of an indicator.
#[async_trait]
pub trait IndicatorSource: Send + Sync {
    /// Retrieve every page for `indicator_id` and normalize the rows.
    async fn fetch(&self, indicator_id: &str) -> Result<IndicatorDataset>;
}

/// Paging header of a remote response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PageInfo {
    #[serde(default)]
    pub page: u32,
    pub pages: u32,
    pub total: u64,
}

/// One decoded response page.
#[derive(Debug, Clone)]
pub struct Page {
    pub info: PageInfo,
    pub rows: Vec<Value>,
}

#[derive(Deserialize)]
struct RawRef {
    #[serde(default)]
    id: Option<String>,
    value: String,
}

#[derive(Deserialize)]
struct RawRow {
    indicator: RawRef,
    country: RawRef,
    date: String,
    #[serde(default)]
    value: Option<f64>,
}

/// Split a response body into its page header and data rows.
///
/// A `null` data element (what the API sends for an empty result) decodes
/// as zero rows.
pub fn parse_page(body: Value) -> Result<Page> {
    let Value::Array(mut parts) = body else {
        return Err(Error::MalformedRemoteData(
            "expected a JSON array at the top level".to_string(),
        ));
    };

    if parts.len() == 1 {
        return Err(Error::InvalidIndicator(invalid_indicator_message(&parts[0])));
    }
    if parts.len() < 2 {
        return Err(Error::MalformedRemoteData(format!(
            "expected [pageInfo, dataRows], got {} elements",
            parts.len()
        )));
    }

    let rows = match parts.swap_remove(1) {
        Value::Array(rows) => rows,
        Value::Null => Vec::new(),
        other => {
            return Err(Error::MalformedRemoteData(format!(
                "data rows must be an array, got {}",
                json_kind(&other)
            )))
        }
    };

    let info: PageInfo = serde_json::from_value(parts.swap_remove(0))
        .map_err(|e| Error::MalformedRemoteData(format!("bad page info: {}", e)))?;

    Ok(Page { info, rows })
}

/// Turn raw data rows into entries, dropping rows without a value.
///
/// The indicator's id and label come from the first row whether or not
/// that row carries a value; an empty row list is an error.
pub fn normalize_rows(rows: &[Value]) -> Result<IndicatorDataset> {
    let first = rows.first().ok_or_else(|| {
        Error::MalformedRemoteData("response contains no data rows".to_string())
    })?;

    let meta = first
        .get("indicator")
        .cloned()
        .ok_or_else(|| Error::MalformedRemoteData("row 0 has no indicator".to_string()))
        .and_then(|v| {
            serde_json::from_value::<RawRef>(v)
                .map_err(|e| Error::MalformedRemoteData(format!("row 0 indicator: {}", e)))
        })?;
    let meta = IndicatorMeta {
        id: meta.id.ok_or_else(|| {
            Error::MalformedRemoteData("row 0 indicator has no id".to_string())
        })?,
        value: meta.value,
    };

    let mut entries = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let raw: RawRow = serde_json::from_value(row.clone())
            .map_err(|e| Error::MalformedRemoteData(format!("row {}: {}", i, e)))?;

        let Some(value) = raw.value else {
            continue;
        };
        let indicator_id = raw.indicator.id.ok_or_else(|| {
            Error::MalformedRemoteData(format!("row {} indicator has no id", i))
        })?;
        entries.push(Entry::new(indicator_id, raw.country.value, raw.date, value));
    }

    Ok(IndicatorDataset { meta, entries })
}

fn invalid_indicator_message(payload: &Value) -> String {
    let detail = payload
        .pointer("/message/0/value")
        .and_then(Value::as_str);
    match detail {
        Some(detail) => format!(
            "Data seems to be unavailable: Please check indicator_id! ({})",
            detail
        ),
        None => "Data seems to be unavailable: Please check indicator_id!".to_string(),
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
