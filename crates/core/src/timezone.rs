//! Timezone handling utilities
//!
//! Weather timestamps arrive as Unix seconds; users read them as wall-clock
//! times in the bot's display zone.

use chrono::{DateTime, Local, Utc};
use chrono_tz::Tz;

/// Wall-clock format used in replies
pub const CLOCK_FORMAT: &str = "%H:%M:%S";

/// Parse an IANA timezone string (e.g., "Europe/Moscow", "Asia/Singapore")
///
/// # Examples
///
/// ```
/// use weatherbot_core::timezone::parse_timezone;
///
/// let tz = parse_timezone("Europe/Moscow").unwrap();
/// assert_eq!(tz.name(), "Europe/Moscow");
/// ```
pub fn parse_timezone(tz_str: &str) -> Result<Tz, chrono_tz::ParseError> {
    tz_str.parse::<Tz>()
}

/// Zone in which times are shown to users
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayZone {
    /// Timezone of the host process
    #[default]
    Local,
    /// Explicit IANA zone
    Named(Tz),
}

impl DisplayZone {
    /// Render an instant as `HH:MM:SS` in this zone
    ///
    /// ```
    /// use chrono::DateTime;
    /// use weatherbot_core::timezone::DisplayZone;
    ///
    /// let instant = DateTime::from_timestamp(0, 0).unwrap();
    /// assert_eq!(DisplayZone::Named(chrono_tz::UTC).clock(instant), "00:00:00");
    /// ```
    pub fn clock(&self, instant: DateTime<Utc>) -> String {
        match self {
            Self::Local => instant.with_timezone(&Local).format(CLOCK_FORMAT).to_string(),
            Self::Named(tz) => instant.with_timezone(tz).format(CLOCK_FORMAT).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_valid_timezones() {
        assert!(parse_timezone("UTC").is_ok());
        assert!(parse_timezone("Europe/Moscow").is_ok());
        assert!(parse_timezone("America/New_York").is_ok());
    }

    #[test]
    fn test_parse_invalid_timezone() {
        assert!(parse_timezone("Invalid/Timezone").is_err());
        assert!(parse_timezone("").is_err());
    }

    #[test]
    fn test_named_zone_clock() {
        // 2024-06-21 18:30:05 UTC is 21:30:05 in Moscow (UTC+3, no DST)
        let instant = Utc.with_ymd_and_hms(2024, 6, 21, 18, 30, 5).unwrap();
        let zone = DisplayZone::Named(chrono_tz::Europe::Moscow);
        assert_eq!(zone.clock(instant), "21:30:05");
    }

    #[test]
    fn test_local_zone_matches_chrono_local() {
        let instant = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let expected = instant.with_timezone(&Local).format("%H:%M:%S").to_string();
        assert_eq!(DisplayZone::Local.clock(instant), expected);
    }
}
