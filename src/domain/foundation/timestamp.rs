//! Timestamp value object for immutable points in time.

use chrono::{DateTime, Duration, FixedOffset, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Immutable point in time, always UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a timestamp for the current moment.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a timestamp from a DateTime<Utc>.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Returns the inner DateTime.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Creates a timestamp from Unix milliseconds.
    ///
    /// Returns `None` when the value is outside chrono's representable range.
    pub fn from_unix_millis(millis: i64) -> Option<Self> {
        Utc.timestamp_millis_opt(millis).single().map(Self)
    }

    /// Returns the timestamp as Unix milliseconds.
    pub fn as_unix_millis(&self) -> i64 {
        self.0.timestamp_millis()
    }

    /// Returns the duration from another timestamp to this one.
    ///
    /// Returns negative duration if other is after self.
    pub fn duration_since(&self, other: &Timestamp) -> Duration {
        self.0.signed_duration_since(other.0)
    }

    /// Creates a new timestamp by adding the specified number of days.
    ///
    /// Negative values subtract days.
    pub fn add_days(&self, days: i64) -> Self {
        Self(self.0 + Duration::days(days))
    }

    /// Creates a new timestamp by subtracting the specified number of days.
    pub fn minus_days(&self, days: i64) -> Self {
        Self(self.0 - Duration::days(days))
    }

    /// Creates a new timestamp by subtracting the specified number of hours.
    pub fn minus_hours(&self, hours: i64) -> Self {
        Self(self.0 - Duration::hours(hours))
    }

    /// Start of the calendar day this instant falls on in `offset`,
    /// carried over to UTC with the same wall-clock date.
    ///
    /// `2024-03-10T01:00Z` at UTC-3 is `2024-03-09` locally, so the result is
    /// `2024-03-09T00:00Z`.
    pub fn start_of_day_in(&self, offset: FixedOffset) -> Self {
        let local_date = self.0.with_timezone(&offset).date_naive();
        Self(local_date.and_time(NaiveTime::MIN).and_utc())
    }

    /// Last representable millisecond of the calendar day this instant falls
    /// on in `offset`, carried over to UTC with the same wall-clock date.
    pub fn end_of_day_in(&self, offset: FixedOffset) -> Self {
        let start = self.start_of_day_in(offset);
        Self(start.0 + Duration::days(1) - Duration::milliseconds(1))
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use proptest::prelude::*;

    fn brt() -> FixedOffset {
        FixedOffset::west_opt(3 * 3600).unwrap()
    }

    fn parse(s: &str) -> Timestamp {
        Timestamp::from_datetime(DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc))
    }

    #[test]
    fn timestamp_now_creates_current_time() {
        let before = Utc::now();
        let ts = Timestamp::now();
        let after = Utc::now();

        assert!(ts.as_datetime() >= &before);
        assert!(ts.as_datetime() <= &after);
    }

    #[test]
    fn from_unix_millis_preserves_value() {
        let ts = Timestamp::from_unix_millis(1_705_276_800_123).unwrap();
        assert_eq!(ts.as_unix_millis(), 1_705_276_800_123);
        assert_eq!(ts.as_datetime().year(), 2024);
    }

    #[test]
    fn start_of_day_uses_local_calendar_date() {
        let ts = parse("2024-03-10T01:00:00Z");
        assert_eq!(ts.start_of_day_in(brt()), parse("2024-03-09T00:00:00Z"));
    }

    #[test]
    fn start_of_day_keeps_same_date_after_local_midnight() {
        let ts = parse("2024-03-10T15:45:00Z");
        assert_eq!(ts.start_of_day_in(brt()), parse("2024-03-10T00:00:00Z"));
    }

    #[test]
    fn end_of_day_is_last_millisecond() {
        let end = parse("2024-03-10T15:45:00Z").end_of_day_in(brt());
        assert_eq!(end.as_datetime().hour(), 23);
        assert_eq!(end.as_datetime().minute(), 59);
        assert_eq!(end.as_datetime().timestamp_subsec_millis(), 999);
    }

    #[test]
    fn timestamp_serializes_to_json() {
        let ts = parse("2024-01-15T10:30:00Z");
        let json = serde_json::to_string(&ts).unwrap();
        assert!(json.contains("2024-01-15"));
    }

    #[test]
    fn minus_hours_subtracts() {
        let ts = parse("2024-01-15T10:30:00Z");
        assert_eq!(ts.minus_hours(2), parse("2024-01-15T08:30:00Z"));
    }

    proptest! {
        #[test]
        fn start_of_day_is_midnight_and_idempotent(millis in 0i64..4_102_444_800_000) {
            let ts = Timestamp::from_unix_millis(millis).unwrap();
            let start = ts.start_of_day_in(brt());
            prop_assert_eq!(start.as_datetime().hour(), 0);
            prop_assert_eq!(start.as_datetime().minute(), 0);
            prop_assert_eq!(start.as_datetime().second(), 0);
            prop_assert_eq!(start.start_of_day_in(FixedOffset::east_opt(0).unwrap()), start);
        }
    }
}
