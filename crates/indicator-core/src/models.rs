//! Core data models used throughout Indicator Store.
//!
//! A [`Collection`] is the metadata record for one imported indicator; its
//! observations are stored as [`Entry`] rows keyed by the indicator id.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Metadata record for a single imported indicator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Collection {
    pub id: i64,
    pub creation_time: DateTime<Utc>,
    pub indicator_id: String,
    pub indicator_value: String,
}

impl Collection {
    /// Relative URI under which the collection is served.
    pub fn uri(&self) -> String {
        format!("/collections/{}", self.id)
    }
}

/// One (country, year, value) observation belonging to a collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry {
    pub indicator_id: String,
    pub country: String,
    pub date: String,
    pub value: f64,
}

impl Entry {
    pub fn new(
        indicator_id: impl Into<String>,
        country: impl Into<String>,
        date: impl Into<String>,
        value: f64,
    ) -> Self {
        Self {
            indicator_id: indicator_id.into(),
            country: country.into(),
            date: date.into(),
            value,
        }
    }
}

/// Identifier and display label of a remote indicator.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorMeta {
    pub id: String,
    pub value: String,
}

/// Sort direction for ordered queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// SQL keyword for this direction.
    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        }
    }
}

/// Collection fields that may appear in an `order_by` list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderField {
    Id,
    CreationTime,
    Indicator,
    IndicatorValue,
}

impl OrderField {
    /// Resolve a client-supplied field name. `indicator` maps onto the
    /// indicator id; unknown names yield `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "id" => Some(OrderField::Id),
            "creation_time" => Some(OrderField::CreationTime),
            "indicator" | "indicator_id" => Some(OrderField::Indicator),
            "indicator_value" => Some(OrderField::IndicatorValue),
            _ => None,
        }
    }

    /// Backing column in the `collections` table.
    pub fn column(self) -> &'static str {
        match self {
            OrderField::Id => "id",
            OrderField::CreationTime => "creation_time",
            OrderField::Indicator => "indicator_id",
            OrderField::IndicatorValue => "indicator_value",
        }
    }
}

/// One key of a multi-key collection ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderKey {
    pub field: OrderField,
    pub direction: SortDirection,
}

impl OrderKey {
    pub fn new(field: OrderField, direction: SortDirection) -> Self {
        Self { field, direction }
    }
}
