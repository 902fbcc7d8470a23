//! Wall-clock time handling for stop opening windows.
//!
//! Stops declare their windows as "HH:MM" strings with no date or timezone.
//! Every itinerary is simulated on a single synthetic day, so a time is
//! just a count of minutes since midnight. Arithmetic past midnight is
//! allowed (the clock keeps counting) but formatting wraps modulo 24h.

use std::fmt;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Minutes in one day.
const MINUTES_PER_DAY: u32 = 24 * 60;

/// Error returned when parsing an invalid time string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// A time of day on the synthetic itinerary day, in minutes since midnight.
///
/// Values past 23:59 are legal results of arithmetic (a long itinerary can
/// run past midnight); they are never produced by parsing.
///
/// # Examples
///
/// ```
/// use nav_server::domain::WallTime;
///
/// let t = WallTime::parse_hhmm("14:30").unwrap();
/// assert_eq!(t.minutes(), 14 * 60 + 30);
/// assert_eq!(t.to_string(), "14:30");
/// assert_eq!(t.format_12h(), "2:30 PM");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WallTime(u32);

impl WallTime {
    /// Midnight, the default opening time for stops without a window.
    pub const START_OF_DAY: WallTime = WallTime(0);

    /// 23:59, the default closing time for stops without a window.
    pub const END_OF_DAY: WallTime = WallTime(MINUTES_PER_DAY - 1);

    /// Create a time from minutes since midnight.
    pub const fn from_minutes(minutes: u32) -> Self {
        Self(minutes)
    }

    /// Create a time from hour and minute components.
    pub fn from_hm(hour: u32, minute: u32) -> Result<Self, TimeError> {
        if hour > 23 {
            return Err(TimeError::new("hour out of range"));
        }
        if minute > 59 {
            return Err(TimeError::new("minute out of range"));
        }
        Ok(Self(hour * 60 + minute))
    }

    /// Parse a time from "HH:MM" (or "H:MM") format.
    ///
    /// # Examples
    ///
    /// ```
    /// use nav_server::domain::WallTime;
    ///
    /// assert!(WallTime::parse_hhmm("00:00").is_ok());
    /// assert!(WallTime::parse_hhmm("9:05").is_ok());
    /// assert!(WallTime::parse_hhmm("23:59").is_ok());
    ///
    /// assert!(WallTime::parse_hhmm("0930").is_err());
    /// assert!(WallTime::parse_hhmm("9:5").is_err());
    /// assert!(WallTime::parse_hhmm("24:00").is_err());
    /// ```
    pub fn parse_hhmm(s: &str) -> Result<Self, TimeError> {
        let s = s.trim();
        let (hour, minute) = s
            .split_once(':')
            .ok_or_else(|| TimeError::new("expected HH:MM format"))?;

        if hour.is_empty() || hour.len() > 2 || minute.len() != 2 {
            return Err(TimeError::new("expected HH:MM format"));
        }
        if !hour.bytes().chain(minute.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(TimeError::new("expected digits"));
        }

        let hour: u32 = hour
            .parse()
            .map_err(|_| TimeError::new("invalid hour"))?;
        let minute: u32 = minute
            .parse()
            .map_err(|_| TimeError::new("invalid minute"))?;

        Self::from_hm(hour, minute)
    }

    /// Minutes since midnight.
    pub fn minutes(&self) -> u32 {
        self.0
    }

    /// This time advanced by `minutes`.
    pub fn plus_minutes(self, minutes: u32) -> Self {
        Self(self.0.saturating_add(minutes))
    }

    /// The clock-face time, wrapping past midnight.
    pub fn to_naive_time(&self) -> NaiveTime {
        let wrapped = self.0 % MINUTES_PER_DAY;
        NaiveTime::from_hms_opt(wrapped / 60, wrapped % 60, 0).unwrap_or(NaiveTime::MIN)
    }

    /// Format as a 12-hour clock string, e.g. "9:00 AM" or "12:15 PM".
    pub fn format_12h(&self) -> String {
        let time = self.to_naive_time();
        let (is_pm, hour) = time.hour12();
        let suffix = if is_pm { "PM" } else { "AM" };
        format!("{}:{:02} {}", hour, time.minute(), suffix)
    }
}

impl fmt::Display for WallTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let time = self.to_naive_time();
        write!(f, "{:02}:{:02}", time.hour(), time.minute())
    }
}

impl fmt::Debug for WallTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WallTime({self})")
    }
}

impl std::str::FromStr for WallTime {
    type Err = TimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_hhmm(s)
    }
}

impl Serialize for WallTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for WallTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse_hhmm(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> WallTime {
        WallTime::parse_hhmm(s).unwrap()
    }

    #[test]
    fn parse_valid_times() {
        assert_eq!(t("00:00").minutes(), 0);
        assert_eq!(t("08:00").minutes(), 480);
        assert_eq!(t("8:00").minutes(), 480);
        assert_eq!(t("23:59").minutes(), 1439);
        assert_eq!(t(" 09:15 ").minutes(), 555);
    }

    #[test]
    fn parse_invalid_times() {
        for bad in ["", "9", "0900", "9:5", "24:00", "12:60", "ab:cd", "-1:00", "123:00"] {
            assert!(WallTime::parse_hhmm(bad).is_err(), "{bad:?} should not parse");
        }
    }

    #[test]
    fn error_display() {
        let err = WallTime::parse_hhmm("nope").unwrap_err();
        assert_eq!(err.to_string(), "invalid time: expected HH:MM format");
    }

    #[test]
    fn format_12h_boundaries() {
        assert_eq!(t("00:00").format_12h(), "12:00 AM");
        assert_eq!(t("00:05").format_12h(), "12:05 AM");
        assert_eq!(t("09:00").format_12h(), "9:00 AM");
        assert_eq!(t("11:59").format_12h(), "11:59 AM");
        assert_eq!(t("12:00").format_12h(), "12:00 PM");
        assert_eq!(t("13:07").format_12h(), "1:07 PM");
        assert_eq!(t("23:59").format_12h(), "11:59 PM");
    }

    #[test]
    fn format_wraps_past_midnight() {
        let late = t("23:30").plus_minutes(45);
        assert_eq!(late.minutes(), 1455);
        assert_eq!(late.format_12h(), "12:15 AM");
        assert_eq!(late.to_string(), "00:15");
    }

    #[test]
    fn ordering_is_chronological() {
        assert!(t("08:30") < t("09:00"));
        assert_eq!(t("08:30").max(t("09:00")), t("09:00"));
        assert!(WallTime::START_OF_DAY < WallTime::END_OF_DAY);
    }

    #[test]
    fn serde_round_trip_uses_hhmm() {
        let json = serde_json::to_string(&t("9:05")).unwrap();
        assert_eq!(json, "\"09:05\"");

        let parsed: WallTime = serde_json::from_str("\"17:45\"").unwrap();
        assert_eq!(parsed, t("17:45"));

        assert!(serde_json::from_str::<WallTime>("\"25:00\"").is_err());
    }
}
