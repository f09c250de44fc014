// Formatters
//
// Shared helpers for turning totals, dates and names into table cells.

use chrono::{Local, TimeZone};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Format a number with thousands separators
///
/// # Examples
/// ```ignore
/// assert_eq!(format_number(1234567), "1,234,567");
/// assert_eq!(format_number(-1200), "-1,200");
/// ```
pub fn format_number(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut result = String::new();

    for (count, ch) in digits.chars().rev().enumerate() {
        if count > 0 && count % 3 == 0 {
            result.insert(0, ',');
        }
        result.insert(0, ch);
    }

    if n < 0 {
        result.insert(0, '-');
    }
    result
}

/// Unix seconds as a local date and time
pub fn format_local(ts: i64) -> String {
    match Local.timestamp_opt(ts, 0).single() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => ts.to_string(),
    }
}

/// Cut `s` to at most `max` terminal columns, marking the cut with an ellipsis
pub fn truncate_to_width(s: &str, max: usize) -> String {
    if s.width() <= max {
        return s.to_string();
    }
    if max == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut width = 0;
    for ch in s.chars() {
        let w = ch.width().unwrap_or(0);
        if width + w > max - 1 {
            break;
        }
        width += w;
        out.push(ch);
    }
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
        assert_eq!(format_number(-1200), "-1,200");
    }

    #[test]
    fn test_truncate_counts_columns() {
        assert_eq!(truncate_to_width("Ann", 10), "Ann");
        assert_eq!(truncate_to_width("Calamity Jane", 6), "Calam…");
        // Wide characters take two columns each
        assert_eq!(truncate_to_width("日本語の名前", 5), "日本…");
        assert_eq!(truncate_to_width("Bob", 0), "");
    }
}
