//! Calendar-date scopes for queries.

use std::fmt;

use chrono::{
    DateTime, Days, FixedOffset, Local, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset,
    TimeZone, Utc,
};
use serde::Serialize;

use crate::error::CoreError;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// How instants are placed on calendar dates.
///
/// `Local` follows the system time zone rules, so each instant takes the
/// offset in force at that instant, not the offset in force today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Calendar {
    /// One offset for every date.
    Fixed(FixedOffset),
    /// The machine's time zone, daylight saving included.
    Local,
}

impl Default for Calendar {
    fn default() -> Self {
        Self::utc()
    }
}

impl Calendar {
    pub fn utc() -> Self {
        Self::Fixed(Utc.fix())
    }

    /// Wall-clock time of `instant`.
    pub fn local_time(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        match self {
            Self::Fixed(offset) => instant.with_timezone(offset).naive_local(),
            Self::Local => instant.with_timezone(&Local).naive_local(),
        }
    }

    /// Calendar date of `instant`.
    pub fn date_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        self.local_time(instant).date()
    }

    /// The current date.
    pub fn today(&self) -> NaiveDate {
        self.date_of(Utc::now())
    }

    /// First instant of `date`, in UTC.
    pub fn start_of_day(&self, date: NaiveDate) -> DateTime<Utc> {
        match self {
            Self::Fixed(offset) => local_midnight_to_utc(date, offset),
            Self::Local => local_midnight_to_utc(date, &Local),
        }
    }
}

/// A single calendar day or an inclusive range of days.
///
/// Scopes compare calendar dates only; the time of day of a sample never
/// matters beyond which date it falls on. An inverted range (`start > end`)
/// is valid and simply contains no dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Scope {
    start: NaiveDate,
    end: NaiveDate,
}

impl Scope {
    pub const fn day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    pub const fn range(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn is_inverted(&self) -> bool {
        self.start > self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Half-open UTC interval covering the scope's days in `calendar`.
    ///
    /// Returns `None` for inverted scopes.
    pub fn utc_bounds(&self, calendar: Calendar) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        if self.is_inverted() {
            return None;
        }
        let start = calendar.start_of_day(self.start);
        let end = self
            .end
            .checked_add_days(Days::new(1))
            .map_or(DateTime::<Utc>::MAX_UTC, |next| calendar.start_of_day(next));
        Some((start, end))
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start.format(DATE_FORMAT))
        } else {
            write!(
                f,
                "{}..{}",
                self.start.format(DATE_FORMAT),
                self.end.format(DATE_FORMAT)
            )
        }
    }
}

/// Converts local midnight of `date` in `zone` to UTC.
fn local_midnight_to_utc<Tz: TimeZone>(date: NaiveDate, zone: &Tz) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::default());
    match zone.from_local_datetime(&midnight) {
        // Single or ambiguous (DST fall-back): use the earlier time
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
        // DST spring-forward gap at midnight: the day starts at 1am local
        LocalResult::None => zone
            .from_local_datetime(&(midnight + chrono::Duration::hours(1)))
            .earliest()
            .map_or_else(|| midnight.and_utc(), |dt| dt.with_timezone(&Utc)),
    }
}

/// Parses a strict `YYYY-MM-DD` date key.
pub fn parse_date_key(input: &str) -> Result<NaiveDate, CoreError> {
    let trimmed = input.trim();
    let well_formed = trimmed.len() == 10
        && trimmed
            .bytes()
            .enumerate()
            .all(|(i, b)| if i == 4 || i == 7 { b == b'-' } else { b.is_ascii_digit() });
    if !well_formed {
        return Err(CoreError::InvalidInput(format!(
            "invalid date {input:?}, expected YYYY-MM-DD"
        )));
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map_err(|err| CoreError::InvalidInput(format!("invalid date {input:?}: {err}")))
}
