//! Shared utility functions.

use chrono::{DateTime, Utc};

/// Format a byte size as a short human-readable string.
///
/// Examples: "1.2MB", "450KB", "23B"
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{}B", bytes);
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    // Kilobytes read better without a decimal; larger units keep one.
    if unit == 1 {
        format!("{:.0}{}", value, UNITS[unit])
    } else {
        format!("{:.1}{}", value, UNITS[unit])
    }
}

/// Calendar date for a millisecond timestamp, e.g. "2024-11-03".
pub fn iso_date(millis: i64) -> Option<String> {
    DateTime::from_timestamp_millis(millis).map(|d: DateTime<Utc>| d.format("%Y-%m-%d").to_string())
}
