/*!
 * Utility functions and helpers for homesim.
 *
 * Timestamp and version-stamp formatting shared by every device, plus
 * lenient readers for document values.
 */
use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::types::Value;

/// Format used for device software version stamps
pub const SOFTWARE_VERSION_FORMAT: &str = "%Y.%m.%d";

/// The current UTC time
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Render a timestamp the way documents store it
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339()
}

/// Parse an RFC 3339 timestamp, normalising it to UTC
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

/// Parse a software version stamp such as `2021.07.28`
pub fn parse_version(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, SOFTWARE_VERSION_FORMAT).ok()
}

/// Render a software version stamp
pub fn format_version(version: &NaiveDate) -> String {
    version.format(SOFTWARE_VERSION_FORMAT).to_string()
}

/// Convert whole or fractional minutes to a duration
pub fn minutes_to_duration(minutes: f64) -> Duration {
    Duration::milliseconds((minutes * 60_000.0).round() as i64)
}

/// Convert a duration to fractional minutes
pub fn duration_to_minutes(duration: &Duration) -> f64 {
    duration.num_milliseconds() as f64 / 60_000.0
}

/// Render an optional timestamp as a document value
pub fn timestamp_value(timestamp: Option<&DateTime<Utc>>) -> Value {
    match timestamp {
        Some(t) => Value::String(format_timestamp(t)),
        None => Value::Null,
    }
}

/// Read a value as text, accepting numbers as their decimal rendering
pub fn value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
