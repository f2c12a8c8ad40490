//! Moment - a single instant with calendar and clock views
//!
//! A `Moment` stores exactly one thing: an absolute UTC instant with
//! nanosecond precision. The calendar date and time-of-day are derived from
//! it on demand, so the three views can never disagree.
//!
//! Time-zone-aware inputs are normalised to UTC at construction. Naive
//! calendar fields are interpreted as UTC unless an explicit offset is given.

use crate::storage::error::{StoreError, StoreResult};
use chrono::{
    DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat,
    TimeZone, Utc,
};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

const NANOS_PER_SECOND: u32 = 1_000_000_000;

/// One point in time
///
/// Equality, ordering and hashing are all defined on the absolute instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Moment {
    instant: DateTime<Utc>,
}

impl Moment {
    /// Create a moment from an absolute UTC instant
    pub fn from_instant(instant: DateTime<Utc>) -> Self {
        Self { instant }
    }

    /// Create a moment from any time-zone-aware datetime
    pub fn from_datetime<Tz: TimeZone>(datetime: DateTime<Tz>) -> Self {
        Self {
            instant: datetime.with_timezone(&Utc),
        }
    }

    /// Create a moment from UTC calendar and clock fields
    pub fn from_calendar(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
    ) -> StoreResult<Self> {
        Self::from_calendar_nanos(year, month, day, hour, minute, second, 0)
    }

    /// Create a moment from UTC calendar and clock fields with a sub-second part
    pub fn from_calendar_nanos(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
        nanos: u32,
    ) -> StoreResult<Self> {
        let naive = validate_fields(year, month, day, hour, minute, second, nanos)?;
        Ok(Self {
            instant: naive.and_utc(),
        })
    }

    /// Create a moment from calendar fields expressed in a fixed UTC offset
    pub fn from_local_calendar(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
        offset: FixedOffset,
    ) -> StoreResult<Self> {
        let naive = validate_fields(year, month, day, hour, minute, second, 0)?;
        // Valid local fields can still land outside the representable UTC range.
        naive
            .checked_sub_signed(offset_duration(offset))
            .map(|utc| Self::from_instant(utc.and_utc()))
            .ok_or(StoreError::InvalidCalendarValue {
                field: "year",
                value: i64::from(year),
            })
    }

    /// Create a moment from Unix milliseconds
    pub fn from_unix_millis(millis: i64) -> StoreResult<Self> {
        DateTime::from_timestamp_millis(millis)
            .map(Self::from_instant)
            .ok_or(StoreError::InvalidCalendarValue {
                field: "unix_millis",
                value: millis,
            })
    }

    /// The current wall-clock time
    pub fn now() -> Self {
        Self::from_instant(Utc::now())
    }

    /// Absolute instant
    pub fn instant(&self) -> DateTime<Utc> {
        self.instant
    }

    /// Calendar date (UTC)
    pub fn date(&self) -> NaiveDate {
        self.instant.date_naive()
    }

    /// Time of day (UTC), including the sub-second remainder
    pub fn time_of_day(&self) -> NaiveTime {
        self.instant.time()
    }

    /// Calendar date as seen from a fixed UTC offset
    ///
    /// Saturates at `NaiveDate::MIN` / `NaiveDate::MAX` for instants at the
    /// edge of the representable range.
    pub fn date_in(&self, offset: FixedOffset) -> NaiveDate {
        match self
            .instant
            .naive_utc()
            .checked_add_signed(offset_duration(offset))
        {
            Some(local) => local.date(),
            None if offset.local_minus_utc() > 0 => NaiveDate::MAX,
            None => NaiveDate::MIN,
        }
    }

    /// Milliseconds since the Unix epoch
    pub fn unix_millis(&self) -> i64 {
        self.instant.timestamp_millis()
    }

    /// Three-way comparison on the absolute instant
    pub fn compare(&self, other: &Moment) -> Ordering {
        self.instant.cmp(&other.instant)
    }
}

impl From<DateTime<Utc>> for Moment {
    fn from(instant: DateTime<Utc>) -> Self {
        Self::from_instant(instant)
    }
}

impl fmt::Display for Moment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.instant.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }
}

impl FromStr for Moment {
    type Err = StoreError;

    /// Accepts RFC 3339, naive ISO 8601 datetimes (read as UTC) and bare dates
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(Self::from_datetime(dt));
        }

        for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
                return Ok(Self::from_instant(naive.and_utc()));
            }
        }

        if let Some(midnight) = NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
        {
            return Ok(Self::from_instant(midnight.and_utc()));
        }

        Err(StoreError::Parse(format!("Could not parse timestamp: {}", s)))
    }
}

fn offset_duration(offset: FixedOffset) -> Duration {
    Duration::seconds(i64::from(offset.local_minus_utc()))
}

fn validate_fields(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
    nanos: u32,
) -> StoreResult<NaiveDateTime> {
    let invalid = |field: &'static str, value: u32| StoreError::InvalidCalendarValue {
        field,
        value: i64::from(value),
    };

    if !(1..=12).contains(&month) {
        return Err(invalid("month", month));
    }
    NaiveDate::from_ymd_opt(year, month, 1).ok_or(StoreError::InvalidCalendarValue {
        field: "year",
        value: i64::from(year),
    })?;
    let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| invalid("day", day))?;

    if hour >= 24 {
        return Err(invalid("hour", hour));
    }
    if minute >= 60 {
        return Err(invalid("minute", minute));
    }
    // Leap seconds are not representable as calendar input.
    if second >= 60 {
        return Err(invalid("second", second));
    }
    if nanos >= NANOS_PER_SECOND {
        return Err(invalid("nanosecond", nanos));
    }

    let time = NaiveTime::from_hms_nano_opt(hour, minute, second, nanos)
        .ok_or_else(|| invalid("second", second))?;
    Ok(NaiveDateTime::new(date, time))
}
