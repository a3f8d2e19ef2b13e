//! Timestamp formatting for version headers.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// `M/D/YY h:mm AM` style, as used in every header and summary.
pub const HEADER_TIME_PATTERN: &str = "%-m/%-d/%y %-I:%M %p";

pub trait TimestampFormatter: Send + Sync {
    fn format(&self, instant: DateTime<Utc>, timezone: &str, pattern: &str) -> String;
}

/// Formats in an IANA timezone via `chrono-tz`. Unknown zone names fall back
/// to UTC.
#[derive(Debug, Default, Clone, Copy)]
pub struct ChronoTzFormatter;

impl TimestampFormatter for ChronoTzFormatter {
    fn format(&self, instant: DateTime<Utc>, timezone: &str, pattern: &str) -> String {
        match timezone.parse::<Tz>() {
            Ok(tz) => instant.with_timezone(&tz).format(pattern).to_string(),
            Err(_) => {
                tracing::warn!("unknown timezone {timezone:?}, formatting in UTC");
                instant.format(pattern).to_string()
            }
        }
    }
}
