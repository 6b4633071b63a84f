//! Return and annualization math.

use crate::{Error, Result};
use tracing::debug;

/// Average calendar year length used to convert day counts to years.
pub const DAYS_PER_YEAR: f64 = 365.25;

/// Calculate holding period return as a percentage.
///
/// Returns `0.0` only for a zero initial value, the same guard the
/// annualized return applies.
pub fn holding_period_return(initial_value: f64, final_value: f64) -> f64 {
    if initial_value == 0.0 {
        return 0.0;
    }
    ((final_value - initial_value) / initial_value) * 100.0
}

/// Convert a whole-day count to fractional years.
pub fn years_from_days(days: i64) -> f64 {
    days as f64 / DAYS_PER_YEAR
}

/// Compound a total return over `years` into a per-year percentage.
///
/// `total_return` is a fraction (0.9 for +90%). Returns `0.0` when `years`
/// is zero. Fails with [`Error::InvalidExponentBase`] when the loss is 100%
/// or more, since a non-positive base has no real fractional power.
pub fn annualize(total_return: f64, years: f64) -> Result<f64> {
    if years == 0.0 {
        debug!("zero-length period, annualized return is 0");
        return Ok(0.0);
    }

    let base = 1.0 + total_return;
    if base <= 0.0 {
        return Err(Error::InvalidExponentBase(base));
    }

    Ok((base.powf(1.0 / years) - 1.0) * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_holding_period_return() {
        let hpr = holding_period_return(10000.0, 11500.0);
        assert_abs_diff_eq!(hpr, 15.0, epsilon = 1e-9);
    }

    #[test]
    fn test_holding_period_return_zero_initial() {
        assert_eq!(holding_period_return(0.0, 500.0), 0.0);
    }

    #[test]
    fn test_holding_period_return_negative_initial() {
        // (-50 - -100) / -100
        let hpr = holding_period_return(-100.0, -50.0);
        assert_abs_diff_eq!(hpr, -50.0, epsilon = 1e-9);
    }

    #[test]
    fn test_years_from_days() {
        assert_abs_diff_eq!(years_from_days(365), 365.0 / 365.25, epsilon = 1e-12);
        assert_eq!(years_from_days(0), 0.0);
    }

    #[test]
    fn test_annualize_half_year() {
        // 10% over half a year compounds to (1.10)^2 - 1 = 21%
        let annualized = annualize(0.10, 0.5).unwrap();
        assert_abs_diff_eq!(annualized, 21.0, epsilon = 1e-9);
    }

    #[test]
    fn test_annualize_two_years() {
        // 21% over two years is 10% per year
        let annualized = annualize(0.21, 2.0).unwrap();
        assert_abs_diff_eq!(annualized, 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_annualize_zero_years() {
        assert_eq!(annualize(0.5, 0.0).unwrap(), 0.0);
    }

    #[test]
    fn test_annualize_partial_loss() {
        // -50% over two years: sqrt(0.5) - 1
        let annualized = annualize(-0.5, 2.0).unwrap();
        assert_abs_diff_eq!(annualized, (0.5_f64.sqrt() - 1.0) * 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_annualize_total_loss_is_error() {
        assert!(matches!(annualize(-1.0, 1.0), Err(Error::InvalidExponentBase(b)) if b == 0.0));
        assert!(matches!(annualize(-1.5, 1.0), Err(Error::InvalidExponentBase(_))));
    }
}
