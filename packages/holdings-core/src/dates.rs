//! Calendar date parsing for price snapshot keys.

use crate::{Error, Result};
use chrono::NaiveDate;

/// Format used for every date in this crate.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` string with strict calendar semantics.
pub fn parse_date(date: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date, DATE_FORMAT).map_err(|source| Error::DateParse {
        date: date.to_string(),
        source,
    })
}

/// Whole days from `start` to `end`. Negative when `end` precedes `start`.
pub fn days_between(start: &str, end: &str) -> Result<i64> {
    let start = parse_date(start)?;
    let end = parse_date(end)?;
    Ok((end - start).num_days())
}
