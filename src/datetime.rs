//! Date/time helpers for API responses and asset metadata.

use chrono::NaiveDate;

use crate::{AssetManagerError, Result};

/// Convert a database datetime string (YYYY-MM-DD HH:MM:SS) to RFC3339 format.
///
/// The database stores times in UTC, so 'Z' is appended.
pub fn to_rfc3339(datetime_str: &str) -> String {
    format!("{}Z", datetime_str.replace(' ', "T"))
}

/// Parse a calendar date in `YYYY-MM-DD` form.
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        AssetManagerError::Validation(format!(
            "Date has wrong format. Use one of these formats instead: YYYY-MM-DD (got \"{value}\")"
        ))
    })
}

/// Normalise an optional date string to `YYYY-MM-DD`.
pub fn normalize_date(value: Option<&str>) -> Result<Option<String>> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(Some(parse_date(v)?.format("%Y-%m-%d").to_string())),
        _ => Ok(None),
    }
}

/// Render a duration in seconds as `HH:MM:SS`.
pub fn format_duration(seconds: i64) -> String {
    let seconds = seconds.max(0);
    format!(
        "{:02}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}
