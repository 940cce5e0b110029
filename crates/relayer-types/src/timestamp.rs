use core::{
    fmt::{Display, Error as FmtError, Formatter},
    ops::{Add, Sub},
    time::Duration,
};

use chrono::{offset::Utc, DateTime, TimeZone};
use flex_error::define_error;
use serde_derive::{Deserialize, Serialize};

pub const ZERO_DURATION: Duration = Duration::from_secs(0);

const NANOS_PER_SEC: u64 = 1_000_000_000;

/// A point in time as reported by a chain (block time, consensus state time).
///
/// Wraps a [`chrono::DateTime<Utc>`]; the protocol encoding is a `u64`
/// Unix timestamp in nanoseconds.
#[derive(PartialEq, Eq, PartialOrd, Ord, Copy, Clone, Debug, Deserialize, Serialize, Hash)]
#[serde(transparent)]
pub struct Timestamp {
    time: DateTime<Utc>,
}

define_error! {
    TimestampOverflowError {
        TimestampOverflow
            |_| { "Timestamp overflow when modifying with duration" }
    }
}

define_error! {
    #[derive(Debug, PartialEq, Eq)]
    ParseTimestampError {
        InvalidTimestampConversion
            {
                secs: i64,
                nanos: u32,
            }
            | _ | { "error converting into Timestamp from seconds + nanoseconds" },
    }
}

impl Timestamp {
    /// Builds a `Timestamp` from a Unix timestamp expressed in nanoseconds.
    pub fn from_nanoseconds(nanoseconds: u64) -> Result<Timestamp, ParseTimestampError> {
        // `chrono` only converts from `i64` seconds, so the `u64` nanos are split
        // into seconds + sub-second nanos first.
        let secs = (nanoseconds / NANOS_PER_SEC) as i64;
        let nanos = (nanoseconds % NANOS_PER_SEC) as u32;

        match Utc.timestamp_opt(secs, nanos) {
            chrono::LocalResult::Single(time) => Ok(Timestamp { time }),
            _ => Err(ParseTimestampError::invalid_timestamp_conversion(
                secs, nanos,
            )),
        }
    }

    /// Returns a `Timestamp` representation of the current time.
    pub fn now() -> Timestamp {
        Timestamp { time: Utc::now() }
    }

    pub fn from_datetime(time: DateTime<Utc>) -> Timestamp {
        Timestamp { time }
    }

    pub fn as_datetime(&self) -> DateTime<Utc> {
        self.time
    }

    /// Convert a `Timestamp` to `u64` value in nanoseconds.
    /// Times before the Unix epoch saturate to 0.
    pub fn as_nanoseconds(&self) -> u64 {
        let secs = u64::try_from(self.time.timestamp()).unwrap_or_default();
        secs.saturating_mul(NANOS_PER_SEC)
            .saturating_add(u64::from(self.time.timestamp_subsec_nanos()))
    }

    /// Computes the duration difference of another `Timestamp` from the current one.
    /// Returns `None` if the other `Timestamp` is more advanced than the current one.
    pub fn duration_since(&self, other: &Timestamp) -> Option<Duration> {
        self.time.signed_duration_since(other.time).to_std().ok()
    }

    /// Checks whether the current timestamp is strictly more advanced
    /// than the `other` timestamp.
    pub fn after(&self, other: &Timestamp) -> bool {
        self.time > other.time
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        write!(f, "{}", self.time.to_rfc3339())
    }
}

impl Add<Duration> for Timestamp {
    type Output = Result<Timestamp, TimestampOverflowError>;

    fn add(self, duration: Duration) -> Result<Timestamp, TimestampOverflowError> {
        let duration = chrono::Duration::from_std(duration)
            .map_err(|_| TimestampOverflowError::timestamp_overflow())?;

        self.time
            .checked_add_signed(duration)
            .map(Self::from_datetime)
            .ok_or_else(TimestampOverflowError::timestamp_overflow)
    }
}

impl Sub<Duration> for Timestamp {
    type Output = Result<Timestamp, TimestampOverflowError>;

    fn sub(self, duration: Duration) -> Result<Timestamp, TimestampOverflowError> {
        let duration = chrono::Duration::from_std(duration)
            .map_err(|_| TimestampOverflowError::timestamp_overflow())?;

        self.time
            .checked_sub_signed(duration)
            .map(Self::from_datetime)
            .ok_or_else(TimestampOverflowError::timestamp_overflow)
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(time: DateTime<Utc>) -> Self {
        Self::from_datetime(time)
    }
}

#[cfg(test)]
mod tests {
    use core::time::Duration;
    use std::thread::sleep;

    use test_log::test;

    use super::{Timestamp, ZERO_DURATION};

    #[test]
    fn test_timestamp_comparisons() {
        let timestamp1 = Timestamp::from_nanoseconds(1).unwrap();
        assert_eq!(timestamp1.as_nanoseconds(), 1);

        let timestamp2 = Timestamp::from_nanoseconds(1_000_000_000).unwrap();
        assert_eq!(timestamp2.as_datetime().timestamp(), 1);
        assert_eq!(timestamp2.as_nanoseconds(), 1_000_000_000);

        assert!(timestamp2.after(&timestamp1));
        assert!(!timestamp1.after(&timestamp2));
        assert!(!timestamp1.after(&timestamp1));
    }

    #[test]
    fn test_timestamp_arithmetic() {
        let time1 = Timestamp::from_nanoseconds(100).unwrap();
        let time2 = Timestamp::from_nanoseconds(150).unwrap();
        let time3 = Timestamp::from_nanoseconds(50).unwrap();
        let duration = Duration::from_nanos(50);

        assert_eq!(time1, (time1 + ZERO_DURATION).unwrap());
        assert_eq!(time2, (time1 + duration).unwrap());
        assert_eq!(time3, (time1 - duration).unwrap());
    }

    #[test]
    fn duration_since_is_none_for_future_timestamps() {
        let earlier = Timestamp::from_nanoseconds(100).unwrap();
        let later = Timestamp::from_nanoseconds(300).unwrap();

        assert_eq!(later.duration_since(&earlier), Some(Duration::from_nanos(200)));
        assert_eq!(earlier.duration_since(&later), None);
    }

    #[test]
    fn adding_huge_duration_overflows() {
        let now = Timestamp::now();
        assert!((now + Duration::from_secs(u64::MAX)).is_err());
    }

    #[test]
    fn subtract_compare() {
        let sleep_duration = Duration::from_micros(100);

        let start = Timestamp::now();
        sleep(sleep_duration);
        let end = Timestamp::now();

        let res = end.duration_since(&start);
        assert!(res.is_some());
        assert!(res.unwrap() > sleep_duration);
    }
}
