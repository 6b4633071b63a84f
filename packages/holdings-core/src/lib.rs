//! Holdings Core - Profit and annualized return over dated price snapshots.
//!
//! This crate provides:
//!
//! - **Priced instruments**: named assets with a sparse `YYYY-MM-DD` price history
//! - **Instrument registry**: an arena handing out stable [`InstrumentId`]s
//! - **Holdings**: quantities per instrument, with profit and annualized return
//! - **Portfolio store**: JSON persistence of instruments and positions
//!
//! # Example
//!
//! ```rust
//! use holdings_core::{Holdings, InstrumentRegistry, PricedInstrument};
//!
//! let mut registry = InstrumentRegistry::new();
//! let stock_a = registry
//!     .register(PricedInstrument::new(
//!         "Stock A",
//!         [("2024-01-01", 100.0), ("2024-12-01", 200.0)],
//!     ))
//!     .unwrap();
//!
//! let mut holdings = Holdings::new(&registry);
//! holdings.add_position(stock_a, 10.0).unwrap();
//! holdings.add_position(stock_a, 20.0).unwrap(); // accumulates to 30
//!
//! assert_eq!(holdings.profit("2024-01-01", "2024-12-01"), 3000.0);
//! let annualized = holdings.annualized_return("2024-01-01", "2024-12-01").unwrap();
//! println!("Annualized Return: {:.2}%", annualized);
//! ```

pub mod dates;
pub mod portfolio;
pub mod types;

// Re-export commonly used types
pub use types::{ApiResponse, InstrumentId, PerformanceReport, PositionProfit, PricedInstrument};

// Re-export main functionality
pub use portfolio::{
    annualize, holding_period_return, years_from_days, Holdings, InstrumentRegistry,
    PortfolioSnapshot, PortfolioStore, PositionEntry, DAYS_PER_YEAR,
};

/// Error types for holdings-core operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid date '{date}' (expected YYYY-MM-DD): {source}")]
    DateParse {
        date: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("Invalid exponent base {0}: total loss of 100% or more cannot be annualized")]
    InvalidExponentBase(f64),

    #[error("Invalid quantity: {0}")]
    InvalidQuantity(f64),

    #[error("Instrument not found: {0}")]
    InstrumentNotFound(String),

    #[error("Duplicate instrument: {0}")]
    DuplicateInstrument(String),

    #[error("Refusing to overwrite unreadable portfolio file: {0}")]
    UnreadableSnapshot(String),
}

/// Result type for holdings-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = Error::InstrumentNotFound("Stock C".to_string());
        assert_eq!(err.to_string(), "Instrument not found: Stock C");

        let err = Error::InvalidQuantity(-5.0);
        assert_eq!(err.to_string(), "Invalid quantity: -5");
    }

    #[test]
    fn test_date_parse_error_keeps_source() {
        use std::error::Error as _;

        let err = dates::parse_date("2024-13-01").unwrap_err();
        assert!(err.to_string().contains("2024-13-01"));
        assert!(err.source().is_some());
    }
}
