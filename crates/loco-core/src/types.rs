//! Core types for loco

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::interval::Interval;

/// RFC822-style timestamp used in listings (e.g. "18 Nov 18 17:15 UTC")
const PRETTY_DATE_FORMAT: &str = "%d %b %y %H:%M %Z";

/// Rotation settings for one tracked file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// How long a file stays active before it is rotated
    pub interval: Interval,
    /// Pattern inserted into rotated file names
    pub suffix: String,
}

impl Config {
    pub fn new<S: Into<String>>(interval: Interval, suffix: S) -> Self {
        Self {
            interval,
            suffix: suffix.into(),
        }
    }
}

/// Persisted rotation state of a tracked file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct State {
    /// Absolute path of the tracked file, the key of the record
    pub full_name: PathBuf,
    /// When the live file was first created (`None` = never)
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Last rotation, or creation if it was never rotated (`None` = never)
    #[serde(default)]
    pub rotated_at: Option<DateTime<Utc>>,
    /// Number of rotations performed so far
    #[serde(default)]
    pub counter: u64,
    pub config: Config,
}

impl State {
    pub fn new<P: Into<PathBuf>>(full_name: P, config: Config) -> Self {
        Self {
            full_name: full_name.into(),
            created_at: None,
            rotated_at: None,
            counter: 0,
            config,
        }
    }

    /// The live file has never been created
    pub fn must_be_created(&self) -> bool {
        self.created_at.is_none()
    }

    /// Strictly more than one interval has elapsed since the last rotation.
    ///
    /// A clock that moved backwards never triggers a rotation.
    pub fn must_be_rotated(&self, now: DateTime<Utc>) -> bool {
        match self.rotated_at {
            None => true,
            Some(rotated_at) => match (now - rotated_at).to_std() {
                Ok(elapsed) => elapsed > self.config.interval.as_duration(),
                Err(_) => false,
            },
        }
    }

    pub fn mark_created(&mut self, now: DateTime<Utc>) {
        self.created_at = Some(now);
        self.rotated_at = Some(now);
    }

    pub fn mark_rotated(&mut self, now: DateTime<Utc>) {
        self.counter += 1;
        self.rotated_at = Some(now);
    }

    /// Replace the rotation settings, keeping timestamps and counter
    pub fn reconfigure(&mut self, config: Config) {
        self.config = config;
    }

    pub fn pretty_created_at(&self) -> String {
        format_date(self.created_at)
    }

    pub fn pretty_rotated_at(&self) -> String {
        format_date(self.rotated_at)
    }
}

fn format_date(date: Option<DateTime<Utc>>) -> String {
    match date {
        Some(d) => d.format(PRETTY_DATE_FORMAT).to_string(),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn config(interval: &str) -> Config {
        Config::new(Interval::parse(interval).unwrap(), "%c")
    }

    fn at(nanos: i64) -> DateTime<Utc> {
        Utc.timestamp_nanos(nanos)
    }

    #[test]
    fn test_new_state() {
        let state = State::new("/path/to/file", config("1d"));
        assert_eq!(state.full_name, PathBuf::from("/path/to/file"));
        assert!(state.created_at.is_none());
        assert!(state.rotated_at.is_none());
        assert_eq!(state.counter, 0);
    }

    #[test]
    fn test_must_be_created() {
        let mut state = State::new("/path/to/file", config("1d"));
        assert!(state.must_be_created());
        state.mark_created(at(42));
        assert!(!state.must_be_created());
        assert_eq!(state.created_at, Some(at(42)));
        assert_eq!(state.rotated_at, Some(at(42)));
    }

    #[test]
    fn test_must_be_rotated_when_never_rotated() {
        let state = State::new("/path/to/file", config("1d"));
        assert!(state.must_be_rotated(at(0)));
    }

    #[test]
    fn test_must_be_rotated_after_interval() {
        let mut state = State::new("/path/to/file", config("2d"));
        let start = Utc.with_ymd_and_hms(2018, 11, 18, 1, 0, 0).unwrap();
        state.mark_created(start);
        assert!(state.must_be_rotated(start + Duration::hours(50)));
        assert!(!state.must_be_rotated(start + Duration::hours(22)));
    }

    #[test]
    fn test_rotation_threshold_is_strict() {
        let mut state = State::new("/path/to/file", config("1d"));
        let start = Utc.with_ymd_and_hms(2018, 11, 18, 0, 0, 0).unwrap();
        state.mark_created(start);
        assert!(!state.must_be_rotated(start + Duration::hours(24)));
        assert!(state.must_be_rotated(start + Duration::hours(24) + Duration::nanoseconds(1)));
    }

    #[test]
    fn test_clock_going_backwards_does_not_rotate() {
        let mut state = State::new("/path/to/file", config("1h"));
        let start = Utc.with_ymd_and_hms(2018, 11, 18, 12, 0, 0).unwrap();
        state.mark_created(start);
        assert!(!state.must_be_rotated(start - Duration::days(3)));
    }

    #[test]
    fn test_mark_rotated() {
        let mut state = State::new("/path/to/file", config("1d"));
        state.mark_created(at(1));
        state.mark_rotated(at(2));
        state.mark_rotated(at(3));
        assert_eq!(state.counter, 2);
        assert_eq!(state.created_at, Some(at(1)));
        assert_eq!(state.rotated_at, Some(at(3)));
    }

    #[test]
    fn test_reconfigure_keeps_progress() {
        let mut state = State::new("/path/to/file", config("1d"));
        state.mark_created(at(1));
        state.mark_rotated(at(2));
        state.reconfigure(Config::new(Interval::parse("2w").unwrap(), "%Y%m%d"));
        assert_eq!(state.counter, 1);
        assert_eq!(state.rotated_at, Some(at(2)));
        assert_eq!(state.config.suffix, "%Y%m%d");
    }

    #[test]
    fn test_pretty_dates() {
        let mut state = State::new("/path/to/file", config("1d"));
        assert_eq!(state.pretty_created_at(), "-");
        assert_eq!(state.pretty_rotated_at(), "-");

        state.created_at = Some(Utc.with_ymd_and_hms(2018, 11, 18, 17, 15, 0).unwrap());
        state.rotated_at = Some(Utc.with_ymd_and_hms(2018, 11, 18, 18, 15, 12).unwrap());
        assert_eq!(state.pretty_created_at(), "18 Nov 18 17:15 UTC");
        assert_eq!(state.pretty_rotated_at(), "18 Nov 18 18:15 UTC");
    }

    #[test]
    fn test_json_round_trip() {
        let state = State {
            full_name: PathBuf::from("/path/to/file.log"),
            created_at: Some(at(1_000_000)),
            rotated_at: Some(at(2_000_000)),
            counter: 42,
            config: config("2d"),
        };
        let json = serde_json::to_string(&state).unwrap();
        let back: State = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn test_json_round_trip_unset_timestamps() {
        let state = State::new("/path/to/file.log", config("3w"));
        let json = serde_json::to_string(&state).unwrap();
        let back: State = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn test_json_schema() {
        let state = State::new("/path/to/file.log", config("48h"));
        let value = serde_json::to_value(&state).unwrap();
        assert_eq!(value["fullName"], "/path/to/file.log");
        assert!(value["createdAt"].is_null());
        assert!(value["rotatedAt"].is_null());
        assert_eq!(value["counter"], 0);
        assert_eq!(value["config"]["interval"], "2d");
        assert_eq!(value["config"]["suffix"], "%c");
    }
}
