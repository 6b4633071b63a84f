//! Core data types for holdings calculations.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A named asset with a sparse date-to-price history.
///
/// Prices are keyed by the exact `YYYY-MM-DD` string they were recorded
/// under. There is no interpolation between snapshots.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PricedInstrument {
    /// Display name, unique within a registry
    name: String,
    /// Price per share keyed by date
    prices: BTreeMap<String, f64>,
}

impl PricedInstrument {
    /// Create an instrument from a name and any collection of `(date, price)` pairs.
    pub fn new<K, I>(name: impl Into<String>, prices: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, f64)>,
    {
        Self {
            name: name.into(),
            prices: prices.into_iter().map(|(d, p)| (d.into(), p)).collect(),
        }
    }

    /// Instrument name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full price history.
    pub fn prices(&self) -> &BTreeMap<String, f64> {
        &self.prices
    }

    /// Price recorded for `date`.
    ///
    /// **Returns `0.0` when no price exists for `date`.** This is not an
    /// error: the missing snapshot silently counts as a zero price, so a
    /// typo in a date or a gap in the history will distort any profit or
    /// return computed from it. Use [`has_price`](Self::has_price) to tell
    /// the two cases apart.
    pub fn price(&self, date: &str) -> f64 {
        self.prices.get(date).copied().unwrap_or(0.0)
    }

    /// Whether a price was recorded for `date`.
    pub fn has_price(&self, date: &str) -> bool {
        self.prices.contains_key(date)
    }

    /// Recorded dates in ascending order.
    pub fn dates(&self) -> impl Iterator<Item = &str> {
        self.prices.keys().map(String::as_str)
    }
}

/// Opaque handle to an instrument inside an [`InstrumentRegistry`](crate::InstrumentRegistry).
///
/// An id only resolves in the registry that issued it (or a clone of that
/// registry). Any other registry reports it as not found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstrumentId {
    pub(crate) registry: u64,
    pub(crate) index: usize,
}

impl fmt::Display for InstrumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.index)
    }
}

/// Profit contributed by a single position between two dates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PositionProfit {
    /// Instrument name
    pub instrument: String,
    /// Quantity held
    pub quantity: f64,
    /// Price at the start date (0 if absent)
    pub start_price: f64,
    /// Price at the end date (0 if absent)
    pub end_price: f64,
    /// (end_price - start_price) * quantity
    pub profit: f64,
}

/// Performance summary of a holdings collection over a date range.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PerformanceReport {
    /// Start date (YYYY-MM-DD)
    pub start_date: String,
    /// End date (YYYY-MM-DD)
    pub end_date: String,
    /// Market value at the start date
    pub initial_value: f64,
    /// Market value at the end date
    pub final_value: f64,
    /// Total profit in currency units
    pub profit: f64,
    /// Holding period return percentage
    pub total_return_percent: f64,
    /// Whole days between the dates (absent when the initial value is zero)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days: Option<i64>,
    /// Annualized return percentage
    pub annualized_return_percent: f64,
}

/// API response wrapper used for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create an error response.
    pub fn err(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error.into()),
        }
    }
}
