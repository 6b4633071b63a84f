//! Portfolio module.
//!
//! Provides the instrument registry, holdings aggregation, return math, and
//! snapshot persistence.

mod holdings;
mod performance;
mod registry;
mod store;

pub use holdings::Holdings;
pub use performance::{annualize, holding_period_return, years_from_days, DAYS_PER_YEAR};
pub use registry::InstrumentRegistry;
pub use store::{PortfolioSnapshot, PortfolioStore, PositionEntry, PORTFOLIO_FILE_ENV};
