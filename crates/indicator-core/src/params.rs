//! Parsing of client-supplied query parameters.
//!
//! Both parsers turn free text into closed types ([`OrderKey`],
//! [`TopQuery`]) before anything reaches the store, so no client text is
//! ever spliced into SQL.

use crate::error::{Error, Result};
use crate::models::{OrderField, OrderKey, SortDirection};

/// Parse an `order_by` value such as `"-indicator,+id"`.
///
/// A leading `-` sorts descending; a leading `+` or no prefix sorts
/// ascending. Blank items are skipped, unknown fields are rejected.
pub fn parse_order_spec(order_by: Option<&str>) -> Result<Vec<OrderKey>> {
    let Some(order_by) = order_by else {
        return Ok(Vec::new());
    };

    let mut keys = Vec::new();
    for item in order_by.split(',') {
        let item = item.trim();
        if item.is_empty() {
            continue;
        }

        let (direction, name) = if let Some(rest) = item.strip_prefix('-') {
            (SortDirection::Descending, rest)
        } else if let Some(rest) = item.strip_prefix('+') {
            (SortDirection::Ascending, rest)
        } else {
            (SortDirection::Ascending, item)
        };

        let field = OrderField::from_name(name).ok_or_else(|| {
            Error::InvalidArgument(format!(
                "cannot order by '{}': expected one of id, creation_time, indicator, indicator_value",
                name
            ))
        })?;
        keys.push(OrderKey::new(field, direction));
    }

    Ok(keys)
}

/// Parsed form of the top/bottom-N `q` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopQuery {
    /// Maximum number of entries; `None` returns every entry for the year.
    pub count: Option<u32>,
    pub direction: SortDirection,
}

impl TopQuery {
    /// Interpret `q`: absent → all entries from the low end, `-N` → bottom
    /// N, `+N` or `N` → top N.
    pub fn parse(q: Option<&str>) -> Result<Self> {
        let Some(raw) = q.map(str::trim) else {
            return Ok(TopQuery {
                count: None,
                direction: SortDirection::Ascending,
            });
        };

        let (direction, digits) = if let Some(rest) = raw.strip_prefix('-') {
            (SortDirection::Ascending, rest)
        } else if let Some(rest) = raw.strip_prefix('+') {
            (SortDirection::Descending, rest)
        } else {
            (SortDirection::Descending, raw)
        };

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidArgument(format!(
                "q must be an integer optionally prefixed with + or -, got '{}'",
                raw
            )));
        }

        let count = digits.parse::<u32>().map_err(|_| {
            Error::InvalidArgument(format!("q is out of range: '{}'", raw))
        })?;

        Ok(TopQuery {
            count: Some(count),
            direction,
        })
    }
}
