//! Reference time for a dashboard evaluation.
//!
//! Every calendar computation (streaks, "today", the current month) goes
//! through a [`Clock`] so tests can pin the date instead of reading the
//! system clock.
//!
//! A clock pairs an instant with a [`Zone`]. Each timestamp is converted
//! with the offset in force on its own date, so a record logged just after
//! midnight in summer stays on that day even when "now" is in winter time.

use chrono::{
    DateTime, Datelike, Days, FixedOffset, Local, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc,
};
use chrono_tz::Tz;

/// Timezone used to turn instants into calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    /// The system's local timezone, DST rules included
    Local,
    /// A constant offset from UTC
    Fixed(FixedOffset),
    /// A named IANA timezone such as `Europe/Berlin`
    Named(Tz),
}

impl Zone {
    /// UTC as a zone
    pub fn utc() -> Self {
        Zone::Fixed(Utc.fix())
    }

    /// Calendar day of `ts` in this zone.
    pub fn date_of(&self, ts: DateTime<Utc>) -> NaiveDate {
        match self {
            Zone::Local => ts.with_timezone(&Local).date_naive(),
            Zone::Fixed(offset) => ts.with_timezone(offset).date_naive(),
            Zone::Named(tz) => ts.with_timezone(tz).date_naive(),
        }
    }

    /// The instant at `local` wall-clock time in this zone.
    ///
    /// Times skipped by a DST jump have no instant.
    fn instant(&self, local: NaiveDateTime) -> Option<DateTime<Utc>> {
        match self {
            Zone::Local => Local
                .from_local_datetime(&local)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc)),
            Zone::Fixed(offset) => offset
                .from_local_datetime(&local)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc)),
            Zone::Named(tz) => tz
                .from_local_datetime(&local)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc)),
        }
    }
}

impl std::str::FromStr for Zone {
    type Err = String;

    /// `local`, `UTC`, or an IANA name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "local" => Ok(Zone::Local),
            "UTC" | "utc" => Ok(Zone::utc()),
            name => name
                .parse::<Tz>()
                .map(Zone::Named)
                .map_err(|e| format!("unknown timezone {:?}: {}", name, e)),
        }
    }
}

/// The instant an evaluation treats as "now", together with the zone used
/// to turn timestamps into calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clock {
    now: DateTime<Utc>,
    zone: Zone,
}

impl Clock {
    /// Clock reading the system time in the local timezone.
    pub fn system() -> Self {
        Self::now_in(Zone::Local)
    }

    /// Clock reading the system time in `zone`.
    pub fn now_in(zone: Zone) -> Self {
        Self {
            now: Utc::now(),
            zone,
        }
    }

    /// Clock pinned to a specific instant with a constant offset.
    pub fn fixed(now: DateTime<FixedOffset>) -> Self {
        Self {
            now: now.with_timezone(&Utc),
            zone: Zone::Fixed(*now.offset()),
        }
    }

    /// Clock pinned to noon UTC on the given day.
    pub fn at_noon_utc(day: NaiveDate) -> Self {
        Self::at_noon(day, Zone::utc())
    }

    /// Clock pinned to local noon on the given day in `zone`.
    pub fn at_noon(day: NaiveDate, zone: Zone) -> Self {
        let now = day
            .and_hms_opt(12, 0, 0)
            .and_then(|noon| zone.instant(noon))
            .unwrap_or_else(Utc::now);
        Self { now, zone }
    }

    /// The current instant.
    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    pub fn zone(&self) -> Zone {
        self.zone
    }

    /// Today's local calendar day.
    pub fn today(&self) -> NaiveDate {
        self.zone.date_of(self.now)
    }

    /// Local calendar day of a record timestamp; missing timestamps count as now.
    pub fn local_day(&self, ts: Option<DateTime<Utc>>) -> NaiveDate {
        match ts {
            Some(ts) => self.zone.date_of(ts),
            None => self.today(),
        }
    }

    /// `today - n` days, saturating at the earliest representable date.
    pub fn days_ago(&self, n: u64) -> NaiveDate {
        self.today()
            .checked_sub_days(Days::new(n))
            .unwrap_or(NaiveDate::MIN)
    }

    /// Whether `ts` falls in the current local calendar month and year.
    pub fn in_current_month(&self, ts: Option<DateTime<Utc>>) -> bool {
        let day = self.local_day(ts);
        let today = self.today();
        day.year() == today.year() && day.month() == today.month()
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::system()
    }
}
