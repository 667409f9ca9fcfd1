//! Rotation interval expressions
//!
//! An interval is written as a positive integer followed by a single unit
//! letter: `m` (minute), `h` (hour), `d` (day), `w` (week) or `M` (month,
//! always 30 days). Units are case-sensitive and nothing else is accepted,
//! so `"2h"` is valid while `"2H"`, `"1.5w"` and `"10s"` are not.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{Error, Result};

const MINUTE: u64 = 60;
const HOUR: u64 = MINUTE * 60;
const DAY: u64 = HOUR * 24;
const WEEK: u64 = DAY * 7;
const MONTH: u64 = DAY * 30;

/// Units from largest to smallest, used when rendering an interval back
const UNITS: &[(char, u64)] = &[('M', MONTH), ('w', WEEK), ('d', DAY), ('h', HOUR), ('m', MINUTE)];

static INTERVAL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]+)([hdwMm])$").expect("Invalid interval regex"));

fn unit_seconds(unit: char) -> Option<u64> {
    UNITS.iter().find(|(u, _)| *u == unit).map(|(_, secs)| *secs)
}

/// Check that `expr` is a well-formed interval expression
pub fn validate(expr: &str) -> Result<()> {
    parse(expr).map(|_| ())
}

/// Parse an interval expression into a duration
pub fn parse(expr: &str) -> Result<Duration> {
    let captures = INTERVAL_REGEX
        .captures(expr)
        .ok_or_else(|| Error::invalid_interval(expr))?;

    let value: u64 = captures[1]
        .parse()
        .map_err(|_| Error::invalid_interval(expr))?;
    let unit = captures[2]
        .chars()
        .next()
        .and_then(unit_seconds)
        .ok_or_else(|| Error::invalid_interval(expr))?;

    if value == 0 {
        return Err(Error::invalid_interval(expr));
    }

    value
        .checked_mul(unit)
        .map(Duration::from_secs)
        .ok_or_else(|| Error::invalid_interval(expr))
}

/// A validated, positive rotation interval.
///
/// Parsed once from its expression and carried as a [`Duration`] afterwards.
/// It serializes back to the shortest expression with the largest exact
/// unit, so `"48h"` is stored as `"2d"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Interval(Duration);

impl Interval {
    pub fn parse(expr: &str) -> Result<Self> {
        parse(expr).map(Interval)
    }

    pub fn as_duration(&self) -> Duration {
        self.0
    }
}

impl FromStr for Interval {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Interval::parse(s)
    }
}

impl From<Interval> for Duration {
    fn from(interval: Interval) -> Self {
        interval.0
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.0.as_secs();
        for (unit, size) in UNITS {
            if secs % size == 0 {
                return write!(f, "{}{}", secs / size, unit);
            }
        }
        // Not reachable through `parse`, every value is a whole number of minutes
        write!(f, "{}m", secs / MINUTE)
    }
}

impl Serialize for Interval {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Interval {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let expr = String::deserialize(deserializer)?;
        Interval::parse(&expr).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_units() {
        assert_eq!(parse("1m").unwrap(), Duration::from_secs(60));
        assert_eq!(parse("2h").unwrap(), Duration::from_secs(2 * 3600));
        assert_eq!(parse("1d").unwrap(), Duration::from_secs(86400));
        assert_eq!(parse("3w").unwrap(), Duration::from_secs(21 * 86400));
        assert_eq!(parse("2M").unwrap(), Duration::from_secs(60 * 86400));
        assert_eq!(parse("24h").unwrap(), parse("1d").unwrap());
    }

    #[test]
    fn test_parse_multi_digit() {
        assert_eq!(parse("90m").unwrap(), Duration::from_secs(90 * 60));
        assert_eq!(parse("007h").unwrap(), Duration::from_secs(7 * 3600));
    }

    #[test]
    fn test_invalid_expressions() {
        for expr in [
            "", "h", "2", "2H", "2D", "2W", "1.5w", "10s", "-1d", " 1d", "1d ", "1dd", "d1",
            "1h30m", "0h", "٣d", "99999999999999999999h",
        ] {
            assert!(parse(expr).is_err(), "{:?} should not parse", expr);
            assert!(validate(expr).is_err(), "{:?} should not validate", expr);
        }
    }

    #[test]
    fn test_validate_agrees_with_parse() {
        for expr in ["1m", "5h", "12d", "1w", "6M"] {
            assert!(validate(expr).is_ok());
            assert!(parse(expr).is_ok());
        }
    }

    #[test]
    fn test_invalid_error_names_expression() {
        let err = parse("2H").unwrap_err();
        assert_eq!(err.to_string(), "Invalid interval: 2H");
    }

    #[test]
    fn test_display_uses_largest_exact_unit() {
        assert_eq!(Interval::parse("48h").unwrap().to_string(), "2d");
        assert_eq!(Interval::parse("30d").unwrap().to_string(), "1M");
        assert_eq!(Interval::parse("14d").unwrap().to_string(), "2w");
        assert_eq!(Interval::parse("90m").unwrap().to_string(), "90m");
        assert_eq!(Interval::parse("25h").unwrap().to_string(), "25h");
    }

    #[test]
    fn test_serde() {
        let interval: Interval = "24h".parse().unwrap();
        let json = serde_json::to_string(&interval).unwrap();
        assert_eq!(json, "\"1d\"");
        let back: Interval = serde_json::from_str(&json).unwrap();
        assert_eq!(back, interval);

        assert!(serde_json::from_str::<Interval>("\"1x\"").is_err());
    }
}
