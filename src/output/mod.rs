// Output formatting: terminal display and CSV export.

pub mod export;
pub mod terminal;

use chrono::{DateTime, FixedOffset, Utc};

/// Truncate a string to at most `max_chars` characters, appending "..." if truncated.
///
/// Unlike byte slicing (`&text[..120]`), this respects UTF-8 character boundaries
/// and will never panic on multi-byte characters like emoji or accented letters.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    let char_count = text.chars().count();
    if char_count <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{truncated}...")
    }
}

/// Current time at the given UTC offset.
pub fn now_at(offset: FixedOffset) -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&offset)
}

/// Minute-precision timestamp used in previews and exports.
pub fn format_timestamp(at: &DateTime<FixedOffset>) -> String {
    at.format("%Y-%m-%d %H:%M").to_string()
}

/// Column header for the timestamp, e.g. "Datetime (UTC+07:00)".
pub fn datetime_header(offset: FixedOffset) -> String {
    format!("Datetime (UTC{offset})")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_truncate_multibyte() {
        assert_eq!(truncate_chars("héllo wörld", 5), "héllo...");
        assert_eq!(truncate_chars("short", 10), "short");
    }

    #[test]
    fn test_format_timestamp() {
        let wib = FixedOffset::east_opt(7 * 3600).unwrap();
        let at = wib.with_ymd_and_hms(2025, 3, 9, 21, 5, 59).unwrap();
        assert_eq!(format_timestamp(&at), "2025-03-09 21:05");
    }

    #[test]
    fn test_datetime_header_shows_offset() {
        let wib = FixedOffset::east_opt(7 * 3600).unwrap();
        assert_eq!(datetime_header(wib), "Datetime (UTC+07:00)");
    }
}
