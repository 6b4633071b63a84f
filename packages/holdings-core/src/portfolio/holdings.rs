//! Holdings aggregation: profit and annualized return across positions.

use super::performance::{annualize, holding_period_return, years_from_days};
use super::registry::InstrumentRegistry;
use crate::dates::days_between;
use crate::types::{InstrumentId, PerformanceReport, PositionProfit, PricedInstrument};
use crate::{Error, Result};
use std::collections::BTreeMap;
use tracing::debug;

/// Quantities held per instrument, backed by a shared registry.
///
/// Instruments absent a price on a queried date contribute a price of `0`
/// (see [`PricedInstrument::price`]).
#[derive(Debug, Clone)]
pub struct Holdings<'r> {
    registry: &'r InstrumentRegistry,
    positions: BTreeMap<InstrumentId, f64>,
}

impl<'r> Holdings<'r> {
    /// Create empty holdings over `registry`.
    pub fn new(registry: &'r InstrumentRegistry) -> Self {
        Self {
            registry,
            positions: BTreeMap::new(),
        }
    }

    /// The registry these holdings draw prices from.
    pub fn registry(&self) -> &'r InstrumentRegistry {
        self.registry
    }

    /// Add `quantity` shares of an instrument.
    ///
    /// Adding an instrument that is already held accumulates onto the
    /// existing quantity. Returns the new total for that instrument.
    pub fn add_position(&mut self, instrument: InstrumentId, quantity: f64) -> Result<f64> {
        if !quantity.is_finite() || quantity < 0.0 {
            return Err(Error::InvalidQuantity(quantity));
        }
        let name = self
            .registry
            .get(instrument)
            .ok_or_else(|| Error::InstrumentNotFound(instrument.to_string()))?
            .name();

        let total = self.positions.entry(instrument).or_insert(0.0);
        *total += quantity;
        debug!(instrument = name, quantity, total = *total, "added position");
        Ok(*total)
    }

    /// Quantity held of an instrument, if any.
    pub fn quantity(&self, instrument: InstrumentId) -> Option<f64> {
        self.positions.get(&instrument).copied()
    }

    /// Iterate over `(instrument, quantity)` in id order.
    pub fn positions(&self) -> impl Iterator<Item = (&'r PricedInstrument, f64)> + '_ {
        let registry = self.registry;
        self.positions
            .iter()
            .filter_map(move |(id, qty)| registry.get(*id).map(|i| (i, *qty)))
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Total market value at `date`.
    pub fn market_value(&self, date: &str) -> f64 {
        self.positions().map(|(i, qty)| i.price(date) * qty).sum()
    }

    /// Market value at the start of a period; the denominator of the return.
    pub fn initial_value(&self, start_date: &str) -> f64 {
        self.market_value(start_date)
    }

    /// Total profit between two dates.
    pub fn profit(&self, start_date: &str, end_date: &str) -> f64 {
        self.positions()
            .map(|(i, qty)| (i.price(end_date) - i.price(start_date)) * qty)
            .sum()
    }

    /// Per-position breakdown of [`profit`](Self::profit).
    pub fn position_profits(&self, start_date: &str, end_date: &str) -> Vec<PositionProfit> {
        self.positions()
            .map(|(i, quantity)| {
                let start_price = i.price(start_date);
                let end_price = i.price(end_date);
                PositionProfit {
                    instrument: i.name().to_string(),
                    quantity,
                    start_price,
                    end_price,
                    profit: (end_price - start_price) * quantity,
                }
            })
            .collect()
    }

    /// Annualized return between two dates, as a percentage.
    ///
    /// Returns `0` when the initial value is zero (including empty holdings,
    /// in which case the dates are not parsed) or when both dates are the
    /// same day. Fails on malformed dates and on a total loss of 100% or
    /// more.
    pub fn annualized_return(&self, start_date: &str, end_date: &str) -> Result<f64> {
        let profit = self.profit(start_date, end_date);
        let initial_value = self.initial_value(start_date);
        let (_, annualized) = self.annualize_over(start_date, end_date, profit, initial_value)?;
        Ok(annualized)
    }

    /// Full performance summary between two dates.
    pub fn performance(&self, start_date: &str, end_date: &str) -> Result<PerformanceReport> {
        let profit = self.profit(start_date, end_date);
        let initial_value = self.initial_value(start_date);
        let final_value = self.market_value(end_date);
        let (days, annualized_return_percent) =
            self.annualize_over(start_date, end_date, profit, initial_value)?;

        Ok(PerformanceReport {
            start_date: start_date.to_string(),
            end_date: end_date.to_string(),
            initial_value,
            final_value,
            profit,
            total_return_percent: holding_period_return(initial_value, initial_value + profit),
            days,
            annualized_return_percent,
        })
    }

    fn annualize_over(
        &self,
        start_date: &str,
        end_date: &str,
        profit: f64,
        initial_value: f64,
    ) -> Result<(Option<i64>, f64)> {
        if initial_value == 0.0 {
            debug!(start_date, "initial value is 0, annualized return is 0");
            return Ok((None, 0.0));
        }

        let days = days_between(start_date, end_date)?;
        let annualized = annualize(profit / initial_value, years_from_days(days))?;
        Ok((Some(days), annualized))
    }
}
