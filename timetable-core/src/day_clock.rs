//! Day keys and the timezone policy that produces them.
//!
//! A timetable uses one [`DayClock`] for everything that depends on where a
//! day starts: grouping events into days, resolving floating and all-day
//! feed times, and working out "today".

use std::fmt;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{TimetableError, TimetableResult};

/// A calendar day under the clock's timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DayKey(NaiveDate);

impl DayKey {
    pub fn new(date: NaiveDate) -> Self {
        DayKey(date)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// Signed number of days from `self` to `other`.
    pub fn days_until(&self, other: DayKey) -> i64 {
        (other.0 - self.0).num_days()
    }
}

impl From<NaiveDate> for DayKey {
    fn from(date: NaiveDate) -> Self {
        DayKey(date)
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// Search direction for nearest-day lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Timezone policy for day boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayClock {
    tz: Tz,
}

impl Default for DayClock {
    fn default() -> Self {
        DayClock::utc()
    }
}

impl DayClock {
    pub fn new(tz: Tz) -> Self {
        DayClock { tz }
    }

    pub fn utc() -> Self {
        DayClock { tz: Tz::UTC }
    }

    /// Build a clock from an IANA timezone name such as `Europe/Dublin`.
    pub fn from_name(name: &str) -> TimetableResult<Self> {
        let tz: Tz = name
            .parse()
            .map_err(|_| TimetableError::Config(format!("Unknown timezone '{}'", name)))?;
        Ok(DayClock { tz })
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    pub fn key_of(&self, instant: DateTime<Utc>) -> DayKey {
        DayKey(instant.with_timezone(&self.tz).date_naive())
    }

    pub fn today(&self, now: DateTime<Utc>) -> DayKey {
        self.key_of(now)
    }

    /// Instant at which `day` begins, expressed in UTC.
    pub fn start_of_day(&self, day: DayKey) -> DateTime<Utc> {
        self.resolve_local(day.0.and_time(NaiveTime::MIN))
    }

    /// Resolve a wall-clock time in this clock's zone.
    pub fn resolve_local(&self, naive: NaiveDateTime) -> DateTime<Utc> {
        resolve_in(&self.tz, naive)
    }
}

/// Resolve a wall-clock time in `tz`.
///
/// Ambiguous times (DST fall-back) take the earlier instant; times inside a
/// DST gap are pushed forward by an hour.
pub(crate) fn resolve_in(tz: &Tz, naive: NaiveDateTime) -> DateTime<Utc> {
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + Duration::hours(1))).earliest())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| naive.and_utc())
}
