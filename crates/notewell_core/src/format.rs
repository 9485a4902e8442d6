//! Display formatting helpers for metrics and dates.
//!
//! # Responsibility
//! - Render timestamps and counts as display strings for projection rows.
//!
//! # Invariants
//! - Formatting never fails: unrepresentable inputs resolve to a
//!   placeholder string instead of an error.
//! - Timestamps are rendered in UTC so output stays deterministic.

use chrono::{LocalResult, TimeZone, Utc};

const PLACEHOLDER: &str = "-";

/// Formats an epoch-ms timestamp as a medium date with time.
///
/// Example: `Mar 7, 2026, 2:34 PM`.
pub fn format_date_time(epoch_ms: i64) -> String {
    match Utc.timestamp_millis_opt(epoch_ms) {
        LocalResult::Single(moment) => moment.format("%b %-d, %Y, %-I:%M %p").to_string(),
        _ => PLACEHOLDER.to_string(),
    }
}

/// Formats an epoch-ms timestamp as a medium date.
///
/// Example: `Mar 7, 2026`.
pub fn format_date(epoch_ms: i64) -> String {
    match Utc.timestamp_millis_opt(epoch_ms) {
        LocalResult::Single(moment) => moment.format("%b %-d, %Y").to_string(),
        _ => PLACEHOLDER.to_string(),
    }
}

/// Formats a count with `,` thousands separators.
pub fn format_count(value: usize) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
