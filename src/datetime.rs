//! Date utilities for feedrelay.
//!
//! Records are tracked at calendar-day granularity in UTC; every comparison
//! made by the retention policy operates on whole days.

use chrono::{DateTime, NaiveDate, Utc};

/// Date format used by the record store (`YYYY-MM-DD`).
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Truncate an instant to its UTC calendar day.
pub fn to_day(dt: &DateTime<Utc>) -> NaiveDate {
    dt.date_naive()
}

/// Parse a stored `YYYY-MM-DD` date.
///
/// Returns `None` if the string is not a valid calendar date.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok()
}

/// Format a day for storage and notification payloads.
pub fn format_date(date: &NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}
