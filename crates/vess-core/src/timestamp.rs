//! ISO-8601 timestamps in the exact form credentials carry them.
//!
//! Credentials store dates as strings because the string, not the instant,
//! is what gets hashed and signed. All timestamps produced here use UTC with
//! millisecond precision and a `Z` suffix (`2024-05-01T12:00:00.000Z`).

use chrono::{DateTime, Months, SecondsFormat, Utc};

use crate::error::CoreError;

/// Default lifetime of an issued credential, in years.
pub const DEFAULT_VALIDITY_YEARS: u32 = 100;

/// Format an instant as an ISO-8601 string with millisecond precision.
pub fn to_iso8601(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse an ISO-8601 / RFC 3339 timestamp.
pub fn parse_iso8601(value: &str) -> Result<DateTime<Utc>, CoreError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| CoreError::InvalidTimestamp(format!("{}: {}", value, e)))
}

/// Add whole calendar years. Feb 29 clamps to Feb 28 in non-leap targets.
pub fn add_years(instant: &DateTime<Utc>, years: u32) -> Result<DateTime<Utc>, CoreError> {
    instant
        .checked_add_months(Months::new(years.saturating_mul(12)))
        .ok_or_else(|| {
            CoreError::DateOutOfRange(format!("{} + {} years", to_iso8601(instant), years))
        })
}

/// Unix seconds as a decimal string.
pub fn to_unix_seconds_string(instant: &DateTime<Utc>) -> String {
    instant.timestamp().to_string()
}
