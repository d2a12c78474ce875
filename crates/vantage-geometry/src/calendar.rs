//! Calendar arithmetic for date/time axes, built on [`chrono`].
//!
//! Instants are whole seconds since the Unix epoch ([`Timestamp`]), which is also the
//! logical coordinate of a date/time axis. Calendar fields are naive UTC
//! ([`CivilDateTime`]). Without a time zone there are no daylight-saving gaps, so every
//! instant has exactly one valid calendar representation.

use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::error::{GeometryError, GeometryResult};

const SECONDS_PER_MINUTE: i64 = 60;
const SECONDS_PER_HOUR: i64 = 3_600;
const SECONDS_PER_DAY: i64 = 86_400;

/// An instant in whole seconds since 1970-01-01 00:00:00 UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp(i64);

impl Timestamp {
    /// The Unix epoch.
    pub const EPOCH: Self = Self(0);

    /// Create from seconds since the Unix epoch.
    pub const fn from_seconds(seconds: i64) -> Self {
        Self(seconds)
    }

    /// Seconds since the Unix epoch.
    pub const fn seconds(self) -> i64 {
        self.0
    }

    /// Latest whole second not after the logical coordinate `seconds`.
    pub fn floor(seconds: f64) -> Self {
        Self(seconds.floor() as i64)
    }

    /// Earliest whole second not before the logical coordinate `seconds`.
    pub fn ceil(seconds: f64) -> Self {
        Self(seconds.ceil() as i64)
    }

    /// Logical coordinate of this instant.
    pub fn as_f64(self) -> f64 {
        self.0 as f64
    }

    pub fn from_naive(naive: NaiveDateTime) -> Self {
        Self(naive.and_utc().timestamp())
    }

    /// Naive UTC date and time of this instant.
    pub fn to_naive(self) -> GeometryResult<NaiveDateTime> {
        DateTime::from_timestamp(self.0, 0)
            .map(|utc| utc.naive_utc())
            .ok_or(GeometryError::TimestampOutOfRange(self.0))
    }

    /// Calendar fields of this instant.
    pub fn to_civil(self) -> GeometryResult<CivilDateTime> {
        self.to_naive().map(CivilDateTime)
    }

    /// Truncate to the start of the enclosing `unit`.
    pub fn truncate(self, unit: TimeUnit) -> GeometryResult<Self> {
        let within = |length: i64| -> GeometryResult<Self> {
            Ok(Self(self.0 - self.0.rem_euclid(length)))
        };
        match unit {
            TimeUnit::Second => Ok(self),
            TimeUnit::Minute => within(SECONDS_PER_MINUTE),
            TimeUnit::Hour => within(SECONDS_PER_HOUR),
            TimeUnit::Day => within(SECONDS_PER_DAY),
            TimeUnit::Month => {
                let date = self.to_naive()?.date();
                Ok(Self::from_date(date.with_day(1).unwrap_or(date)))
            }
            TimeUnit::Year => {
                let date = self.to_naive()?.date();
                Ok(Self::from_date(date.with_ordinal(1).unwrap_or(date)))
            }
        }
    }

    /// Move `count` units forward (or backward when negative).
    ///
    /// Month and year steps keep the day of month, clamped to the target month's length.
    pub fn add(self, unit: TimeUnit, count: i64) -> GeometryResult<Self> {
        let shifted = |length: i64| {
            count
                .checked_mul(length)
                .and_then(|delta| self.0.checked_add(delta))
                .map(Self)
                .ok_or(GeometryError::TimestampOutOfRange(self.0))
        };
        match unit {
            TimeUnit::Second => shifted(1),
            TimeUnit::Minute => shifted(SECONDS_PER_MINUTE),
            TimeUnit::Hour => shifted(SECONDS_PER_HOUR),
            TimeUnit::Day => shifted(SECONDS_PER_DAY),
            TimeUnit::Month => Ok(self.to_civil()?.add_months(count)?.to_timestamp()),
            TimeUnit::Year => {
                let months = count
                    .checked_mul(12)
                    .ok_or(GeometryError::TimestampOutOfRange(self.0))?;
                Ok(self.to_civil()?.add_months(months)?.to_timestamp())
            }
        }
    }

    fn from_date(date: NaiveDate) -> Self {
        Self::from_naive(date.and_time(NaiveTime::MIN))
    }
}

/// Calendar units, finest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TimeUnit {
    Second,
    Minute,
    Hour,
    Day,
    Month,
    Year,
}

impl TimeUnit {
    /// The next coarser unit whose boundaries subdivide into this unit.
    pub fn parent(self) -> Option<Self> {
        match self {
            Self::Second => Some(Self::Minute),
            Self::Minute => Some(Self::Hour),
            Self::Hour => Some(Self::Day),
            Self::Day => Some(Self::Month),
            Self::Month => Some(Self::Year),
            Self::Year => None,
        }
    }

    /// Nominal length in seconds (30-day months, 365.25-day years).
    pub fn approx_seconds(self) -> f64 {
        match self {
            Self::Second => 1.0,
            Self::Minute => SECONDS_PER_MINUTE as f64,
            Self::Hour => SECONDS_PER_HOUR as f64,
            Self::Day => SECONDS_PER_DAY as f64,
            Self::Month => 30.0 * SECONDS_PER_DAY as f64,
            Self::Year => 365.25 * SECONDS_PER_DAY as f64,
        }
    }
}

/// A valid calendar date and time of day (naive UTC).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CivilDateTime(NaiveDateTime);

impl CivilDateTime {
    /// Create a validated date and time.
    pub fn new(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
    ) -> GeometryResult<Self> {
        let date = NaiveDate::from_ymd_opt(year, month, day)
            .ok_or(GeometryError::InvalidCalendarDate { year, month, day })?;
        let time = NaiveTime::from_hms_opt(hour, minute, second).ok_or_else(|| {
            GeometryError::InvalidConfiguration(format!(
                "invalid time of day {:02}:{:02}:{:02}",
                hour, minute, second
            ))
        })?;
        Ok(Self(date.and_time(time)))
    }

    /// Create a validated date at midnight.
    pub fn date(year: i32, month: u32, day: u32) -> GeometryResult<Self> {
        Self::new(year, month, day, 0, 0, 0)
    }

    /// Midnight on January 1st of `year`.
    pub fn new_year(year: i32) -> GeometryResult<Self> {
        Self::date(year, 1, 1)
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// 1..=12
    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// 1..=days_in_month
    pub fn day(&self) -> u32 {
        self.0.day()
    }

    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    pub fn minute(&self) -> u32 {
        self.0.minute()
    }

    pub fn second(&self) -> u32 {
        self.0.second()
    }

    /// Number of days in this date's month.
    pub fn days_in_month(&self) -> u32 {
        days_in_month(self.year(), self.month())
    }

    pub fn to_timestamp(&self) -> Timestamp {
        Timestamp::from_naive(self.0)
    }

    /// Shift by whole months, clamping the day to the length of the target month.
    pub fn add_months(&self, months: i64) -> GeometryResult<Self> {
        let out_of_range = || GeometryError::TimestampOutOfRange(self.to_timestamp().seconds());
        let magnitude = u32::try_from(months.unsigned_abs()).map_err(|_| out_of_range())?;
        let shifted = if months >= 0 {
            self.0.checked_add_months(Months::new(magnitude))
        } else {
            self.0.checked_sub_months(Months::new(magnitude))
        };
        shifted.map(Self).ok_or_else(out_of_range)
    }
}

impl std::fmt::Display for CivilDateTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d %H:%M:%S"))
    }
}

impl From<CivilDateTime> for Timestamp {
    fn from(civil: CivilDateTime) -> Self {
        civil.to_timestamp()
    }
}

/// Number of days in `month` of `year`, or 0 when the month does not exist.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return 0;
    };
    match first.checked_add_months(Months::new(1)) {
        Some(next) => next.signed_duration_since(first).num_days() as u32,
        // Only the last representable December has no successor.
        None => 31,
    }
}
