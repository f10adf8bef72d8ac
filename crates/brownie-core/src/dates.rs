//! # Calendar Helpers
//!
//! Month windows for the monthly rollup and Brazilian date formatting.
//!
//! ## Calendar Months, Not Elapsed Time
//! ```text
//! reference: 2025-02-17
//!      │
//!      ▼
//! month_bounds ──► (2025-02-01, 2025-02-28)   both ends inclusive
//!
//! "last 30 days" would cross into January; the monthly report never does.
//! ```

use chrono::{Datelike, NaiveDate};

use crate::error::ValidationError;

/// First and last calendar day of the month containing `date`.
///
/// ## Example
/// ```rust
/// use brownie_core::dates::month_bounds;
/// use chrono::NaiveDate;
///
/// let (first, last) = month_bounds(NaiveDate::from_ymd_opt(2024, 2, 17).unwrap());
/// assert_eq!(first, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
/// assert_eq!(last, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
/// ```
pub fn month_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = date.with_day(1).unwrap_or(date);
    let (next_year, next_month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    let last = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .unwrap_or(date);
    (first, last)
}

/// True when `date` falls in the same calendar month as `reference`.
pub fn in_month_of(date: NaiveDate, reference: NaiveDate) -> bool {
    let (first, last) = month_bounds(reference);
    date >= first && date <= last
}

/// Formats as `DD/MM/YYYY`.
pub fn format_date_br(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Parses a form date in `YYYY-MM-DD` or `DD/MM/YYYY`.
///
/// Surrounding whitespace is ignored. No timezone conversion happens, so a
/// date typed as the 1st stays the 1st.
pub fn parse_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ValidationError::required("date"));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%d/%m/%Y"))
        .map_err(|_| ValidationError::invalid_format("date", "expected YYYY-MM-DD or DD/MM/YYYY"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_month_bounds() {
        assert_eq!(month_bounds(d(2025, 1, 31)), (d(2025, 1, 1), d(2025, 1, 31)));
        assert_eq!(month_bounds(d(2025, 2, 1)), (d(2025, 2, 1), d(2025, 2, 28)));
        assert_eq!(month_bounds(d(2024, 2, 10)), (d(2024, 2, 1), d(2024, 2, 29)));
        assert_eq!(month_bounds(d(2025, 12, 25)), (d(2025, 12, 1), d(2025, 12, 31)));
    }

    #[test]
    fn test_in_month_of_is_inclusive() {
        let reference = d(2025, 4, 15);
        assert!(in_month_of(d(2025, 4, 1), reference));
        assert!(in_month_of(d(2025, 4, 30), reference));
        assert!(!in_month_of(d(2025, 3, 31), reference));
        assert!(!in_month_of(d(2025, 5, 1), reference));
        assert!(!in_month_of(d(2024, 4, 15), reference));
    }

    #[test]
    fn test_format_date_br() {
        assert_eq!(format_date_br(d(2025, 3, 7)), "07/03/2025");
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2025-03-07").unwrap(), d(2025, 3, 7));
        assert_eq!(parse_date(" 07/03/2025 ").unwrap(), d(2025, 3, 7));
        assert_eq!(parse_date(""), Err(ValidationError::required("date")));
        assert!(parse_date("31/02/2025").is_err());
        assert!(parse_date("March 7").is_err());
    }
}
