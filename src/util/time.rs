//! Timestamp helpers for the store.
//!
//! Timestamps are stored as UTC text with a fixed width
//! (`2025-01-15T12:00:00.000000Z`) so lexical and chronological order agree.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeZone, Utc};

/// Current time truncated to the stored precision.
#[must_use]
pub fn now() -> DateTime<Utc> {
    let now = Utc::now();
    parse_timestamp(&format_timestamp(&now)).unwrap_or(now)
}

/// Format a timestamp for storage.
#[must_use]
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a stored timestamp.
///
/// Accepts RFC3339 and the `SQLite` `CURRENT_TIMESTAMP` form.
#[must_use]
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}
