//! Focus samples captured from the desktop.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::scope::Calendar;
use crate::types::SampleId;

/// One foreground-focus observation.
///
/// Samples are immutable once recorded. The capture process emits one per
/// tick; the tick length is configuration, not something the engine assumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    /// Unique identifier for this sample.
    pub id: SampleId,
    /// When the observation was taken.
    pub timestamp: DateTime<Utc>,
    /// Owning application name (e.g. "Visual Studio Code").
    pub application_name: String,
    /// Process that owned the focused window.
    pub process_id: u32,
    /// Window title at observation time.
    #[serde(default)]
    pub title: String,
    /// Resident memory of the owning process in bytes, if captured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_usage: Option<u64>,
}

impl Sample {
    /// Calendar date of the sample in `calendar`.
    pub fn date_in(&self, calendar: Calendar) -> NaiveDate {
        calendar.date_of(self.timestamp)
    }
}

/// Checks that samples are sorted ascending by timestamp.
///
/// Equal timestamps are allowed.
pub fn ensure_ordered(samples: &[Sample]) -> Result<(), CoreError> {
    for (index, pair) in samples.windows(2).enumerate() {
        if pair[1].timestamp < pair[0].timestamp {
            return Err(CoreError::OutOfOrderInput {
                index: index + 1,
                previous: pair[0].timestamp,
                current: pair[1].timestamp,
            });
        }
    }
    Ok(())
}
