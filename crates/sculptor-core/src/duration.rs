//! Usage durations as hours, minutes and seconds.
//!
//! A [`Duration`] is only ever built from a whole number of seconds. Merging
//! two durations sums their second totals and decomposes the result again,
//! so `minutes` and `seconds` always stay below 60.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

const SECONDS_PER_MINUTE: u64 = 60;
const SECONDS_PER_HOUR: u64 = 3_600;

/// Canonical `{hours, minutes, seconds}` decomposition of a second count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "DurationParts")]
pub struct Duration {
    hours: u64,
    minutes: u64,
    seconds: u64,
}

impl Duration {
    pub const ZERO: Self = Self::from_secs(0);

    /// Decomposes an unsigned second count.
    pub const fn from_secs(total: u64) -> Self {
        Self {
            hours: total / SECONDS_PER_HOUR,
            minutes: (total % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE,
            seconds: total % SECONDS_PER_MINUTE,
        }
    }

    /// Decomposes a signed second count, rejecting negative values.
    pub fn from_seconds(total: i64) -> Result<Self, CoreError> {
        u64::try_from(total)
            .map(Self::from_secs)
            .map_err(|_| CoreError::InvalidInput(format!("negative seconds: {total}")))
    }

    /// Merges two durations through their second totals.
    #[must_use]
    pub const fn add_seconds_totals(a: Self, b: Self) -> Self {
        Self::from_secs(a.total_seconds().saturating_add(b.total_seconds()))
    }

    pub const fn hours(&self) -> u64 {
        self.hours
    }

    pub const fn minutes(&self) -> u64 {
        self.minutes
    }

    pub const fn seconds(&self) -> u64 {
        self.seconds
    }

    pub const fn total_seconds(&self) -> u64 {
        self.hours * SECONDS_PER_HOUR + self.minutes * SECONDS_PER_MINUTE + self.seconds
    }

    pub const fn is_zero(&self) -> bool {
        self.total_seconds() == 0
    }
}

impl TryFrom<f64> for Duration {
    type Error = CoreError;

    /// Accepts wire values such as JSON numbers; they must be whole and non-negative.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn try_from(total: f64) -> Result<Self, Self::Error> {
        if !total.is_finite() || total < 0.0 || total.fract() != 0.0 || total > u64::MAX as f64 {
            return Err(CoreError::InvalidInput(format!(
                "seconds must be a non-negative integer, got {total}"
            )));
        }
        Ok(Self::from_secs(total as u64))
    }
}

impl Add for Duration {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::add_seconds_totals(self, rhs)
    }
}

impl AddAssign for Duration {
    fn add_assign(&mut self, rhs: Self) {
        *self = Self::add_seconds_totals(*self, rhs);
    }
}

impl Sum for Duration {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Self::add_seconds_totals)
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}h {}m {}s", self.hours, self.minutes, self.seconds)
    }
}

/// Unvalidated wire shape, checked before becoming a [`Duration`].
#[derive(Deserialize)]
struct DurationParts {
    hours: u64,
    minutes: u64,
    seconds: u64,
}

impl TryFrom<DurationParts> for Duration {
    type Error = CoreError;

    fn try_from(parts: DurationParts) -> Result<Self, Self::Error> {
        if parts.minutes >= SECONDS_PER_MINUTE || parts.seconds >= SECONDS_PER_MINUTE {
            return Err(CoreError::InvalidInput(format!(
                "non-canonical duration {}h {}m {}s",
                parts.hours, parts.minutes, parts.seconds
            )));
        }
        // total_seconds must stay representable
        let total = parts
            .hours
            .checked_mul(SECONDS_PER_HOUR)
            .and_then(|secs| secs.checked_add(parts.minutes * SECONDS_PER_MINUTE + parts.seconds));
        if total.is_none() {
            return Err(CoreError::InvalidInput(format!(
                "duration of {} hours is out of range",
                parts.hours
            )));
        }
        Ok(Self {
            hours: parts.hours,
            minutes: parts.minutes,
            seconds: parts.seconds,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decomposition_is_canonical_and_lossless() {
        let samples = (0..10_000).chain([86_399, 86_400, 1_000_000, 123_456_789]);
        for total in samples {
            let d = Duration::from_secs(total);
            assert!(d.minutes() < 60, "minutes overflow for {total}");
            assert!(d.seconds() < 60, "seconds overflow for {total}");
            assert_eq!(d.hours() * 3600 + d.minutes() * 60 + d.seconds(), total);
            assert_eq!(d.total_seconds(), total);
        }
    }

    #[test]
    fn from_seconds_decomposes_known_values() {
        let d = Duration::from_seconds(3_725).unwrap();
        assert_eq!((d.hours(), d.minutes(), d.seconds()), (1, 2, 5));
        assert_eq!(Duration::from_seconds(60).unwrap(), Duration::from_secs(60));
        assert!(Duration::from_seconds(0).unwrap().is_zero());
    }

    #[test]
    fn from_seconds_rejects_negative() {
        let err = Duration::from_seconds(-1).unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput(_)));
    }

    #[test]
    fn float_seconds_must_be_whole_and_non_negative() {
        assert_eq!(Duration::try_from(90.0).unwrap(), Duration::from_secs(90));
        assert!(Duration::try_from(1.5).is_err());
        assert!(Duration::try_from(-3.0).is_err());
        assert!(Duration::try_from(f64::NAN).is_err());
        assert!(Duration::try_from(f64::INFINITY).is_err());
    }

    #[test]
    fn merging_carries_through_totals() {
        let a = Duration::from_secs(45 * 60 + 50);
        let b = Duration::from_secs(30 * 60 + 20);
        let merged = Duration::add_seconds_totals(a, b);
        assert_eq!((merged.hours(), merged.minutes(), merged.seconds()), (1, 16, 10));
    }

    #[test]
    fn merging_matches_decomposing_the_sum() {
        for (c1, c2) in [(0, 0), (59, 1), (3_599, 1), (40, 20), (7_261, 3_599), (1, 86_399)] {
            assert_eq!(
                Duration::add_seconds_totals(Duration::from_secs(c1), Duration::from_secs(c2)),
                Duration::from_secs(c1 + c2),
                "{c1} + {c2}"
            );
        }
    }

    #[test]
    fn operators_use_total_seconds() {
        let mut d = Duration::from_secs(59);
        d += Duration::from_secs(1);
        assert_eq!((d.minutes(), d.seconds()), (1, 0));

        let total: Duration = [30, 30, 3_540].into_iter().map(Duration::from_secs).sum();
        assert_eq!(total, Duration::from_secs(3_600));
        assert_eq!(total.hours(), 1);
    }

    #[test]
    fn serializes_as_hours_minutes_seconds() {
        let json = serde_json::to_string(&Duration::from_secs(3_661)).unwrap();
        assert_eq!(json, r#"{"hours":1,"minutes":1,"seconds":1}"#);
    }

    #[test]
    fn deserialization_rejects_non_canonical_parts() {
        let ok: Duration = serde_json::from_str(r#"{"hours":0,"minutes":1,"seconds":0}"#).unwrap();
        assert_eq!(ok.total_seconds(), 60);

        let result: Result<Duration, _> =
            serde_json::from_str(r#"{"hours":0,"minutes":60,"seconds":0}"#);
        assert!(result.is_err());
    }

    #[test]
    fn deserialization_rejects_hours_beyond_second_range() {
        let max = u64::MAX / SECONDS_PER_HOUR;
        let ok: Duration =
            serde_json::from_str(&format!(r#"{{"hours":{max},"minutes":0,"seconds":0}}"#)).unwrap();
        assert_eq!(ok.total_seconds(), max * SECONDS_PER_HOUR);
        assert_eq!(Duration::add_seconds_totals(ok, ok).total_seconds(), u64::MAX);

        for hours in [max + 1, u64::MAX] {
            let json = format!(r#"{{"hours":{hours},"minutes":0,"seconds":0}}"#);
            let result: Result<Duration, _> = serde_json::from_str(&json);
            assert!(result.is_err(), "{hours}");
        }
    }

    #[test]
    fn display_format() {
        assert_eq!(Duration::from_secs(3_725).to_string(), "1h 2m 5s");
        assert_eq!(Duration::ZERO.to_string(), "0h 0m 0s");
    }
}
