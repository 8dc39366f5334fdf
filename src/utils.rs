//! Utility functions for relative time display and string truncation.
//!
//! This module provides helper functions used by the renderers and logging:
//! - Relative "time ago" phrasing for publication timestamps
//! - Character-safe truncation for card and line layouts
//! - Byte-bounded truncation for log previews

use chrono::{DateTime, Utc};

/// Describe how long ago `then` was, relative to `now`.
///
/// Timestamps in the future (clock skew between provider and host) are
/// reported as "just now".
///
/// # Arguments
///
/// * `then` - The moment being described, usually a publication time
/// * `now` - Reference time
///
/// # Returns
///
/// A phrase in the largest whole unit that fits: minutes, hours, days,
/// months (30 days), or years (365 days).
///
/// # Examples
///
/// ```ignore
/// assert_eq!(time_ago(now - Duration::minutes(5), now), "5 minutes ago");
/// assert_eq!(time_ago(now - Duration::hours(1), now), "1 hour ago");
/// ```
pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(then);
    let (amount, unit) = if elapsed.num_minutes() < 1 {
        return "just now".to_string();
    } else if elapsed.num_hours() < 1 {
        (elapsed.num_minutes(), "minute")
    } else if elapsed.num_days() < 1 {
        (elapsed.num_hours(), "hour")
    } else if elapsed.num_days() < 30 {
        (elapsed.num_days(), "day")
    } else if elapsed.num_days() < 365 {
        (elapsed.num_days() / 30, "month")
    } else {
        (elapsed.num_days() / 365, "year")
    };
    let plural = if amount == 1 { "" } else { "s" };
    format!("{amount} {unit}{plural} ago")
}

/// Shorten `s` to at most `max` characters, ending in `…` when cut.
///
/// # Arguments
///
/// * `s` - Text to shorten
/// * `max` - Maximum length in characters, ellipsis included
///
/// # Returns
///
/// `s` unchanged if it fits, otherwise its first `max - 1` characters with
/// trailing whitespace trimmed and `…` appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_chars("Headline", 20), "Headline");
/// assert_eq!(truncate_chars("Breaking news", 9), "Breaking…");
/// ```
pub fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let kept: String = s.chars().take(max.saturating_sub(1)).collect();
    format!("{}…", kept.trim_end())
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut at the nearest character boundary at or below `max`
/// bytes, with an ellipsis and the number of dropped bytes appended.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}
