//! Human-readable timestamp format shared by requests and reports
//!
//! Timestamps are exchanged as `HH:MM:SS DD.MM.YYYY` and interpreted as UTC.

use chrono::{DateTime, NaiveDateTime, ParseError, Utc};

/// `chrono` format string for `HH:MM:SS DD.MM.YYYY`
pub const TIMESTAMP_FORMAT: &str = "%H:%M:%S %d.%m.%Y";

/// Render a timestamp as `HH:MM:SS DD.MM.YYYY`
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse `HH:MM:SS DD.MM.YYYY` into a UTC timestamp
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, ParseError> {
    NaiveDateTime::parse_from_str(s.trim(), TIMESTAMP_FORMAT).map(|naive| naive.and_utc())
}
