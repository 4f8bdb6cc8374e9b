//! Session reconstruction from focus samples.
//!
//! A session is a maximal run of consecutive samples owned by the same
//! process. Reconstruction is a single forward pass with no lookahead:
//!
//! 1. The first sample opens a session.
//! 2. A sample with the same `process_id` extends the open session.
//! 3. A sample with a different `process_id` (or, when configured, one that
//!    follows a gap longer than `max_gap`) closes it and opens the next.
//!
//! Sessions partition their input: concatenating every session's samples
//! reproduces the input sequence exactly.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::duration::Duration;
use crate::error::CoreError;
use crate::sample::Sample;
use crate::types::{SampleId, SessionId};

/// Configuration for session reconstruction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionConfig {
    /// Split a same-process run when consecutive samples are further apart
    /// than this. `None` merges across any gap.
    pub max_gap: Option<chrono::Duration>,
}

/// A continuous run of focus on one process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    /// Deterministic ID derived from the process and first sample.
    pub id: SessionId,
    /// Process shared by every sample in the session.
    pub process_id: u32,
    /// Application name of the first sample.
    pub owner_name: String,
    /// Timestamp of the first sample.
    pub start: DateTime<Utc>,
    /// Timestamp of the last sample.
    pub end: DateTime<Utc>,
    /// Member samples in timestamp order.
    pub samples: Vec<Sample>,
}

impl Session {
    fn open(sample: Sample) -> Self {
        Self {
            id: session_id(sample.process_id, &sample.id),
            process_id: sample.process_id,
            owner_name: sample.application_name.clone(),
            start: sample.timestamp,
            end: sample.timestamp,
            samples: vec![sample],
        }
    }

    fn extend(&mut self, sample: Sample) {
        self.end = sample.timestamp;
        self.samples.push(sample);
    }

    /// Wall-clock span between the first and last sample.
    pub fn elapsed(&self) -> chrono::Duration {
        self.end - self.start
    }

    /// [`Self::elapsed`] as an hours/minutes/seconds duration.
    pub fn elapsed_duration(&self) -> Duration {
        Duration::from_secs(u64::try_from(self.elapsed().num_seconds()).unwrap_or(0))
    }

    /// IDs of the member samples, for deleting the session from a store.
    pub fn sample_ids(&self) -> Vec<SampleId> {
        self.samples.iter().map(|s| s.id.clone()).collect()
    }
}

/// Derives the stable session ID for a run starting at `first_sample`.
pub fn session_id(process_id: u32, first_sample: &SampleId) -> SessionId {
    let content = format!("session|{process_id}|{first_sample}");
    SessionId::from(Uuid::new_v5(&Uuid::NAMESPACE_OID, content.as_bytes()))
}

/// Groups time-ordered samples into sessions.
///
/// Fails with [`CoreError::OutOfOrderInput`] if a sample is earlier than its
/// predecessor; the input is never sorted here.
pub fn reconstruct(samples: Vec<Sample>, config: &SessionConfig) -> Result<Vec<Session>, CoreError> {
    let mut sessions: Vec<Session> = Vec::new();
    let mut previous: Option<DateTime<Utc>> = None;

    for (index, sample) in samples.into_iter().enumerate() {
        if let Some(prev) = previous {
            if sample.timestamp < prev {
                return Err(CoreError::OutOfOrderInput {
                    index,
                    previous: prev,
                    current: sample.timestamp,
                });
            }
        }
        previous = Some(sample.timestamp);

        match sessions.last_mut() {
            Some(current) if continues(current, &sample, config) => current.extend(sample),
            _ => sessions.push(Session::open(sample)),
        }
    }

    Ok(sessions)
}

fn continues(session: &Session, sample: &Sample, config: &SessionConfig) -> bool {
    if session.process_id != sample.process_id {
        return false;
    }
    config
        .max_gap
        .is_none_or(|max_gap| sample.timestamp - session.end <= max_gap)
}

/// Drops sessions whose span is not longer than `min`.
///
/// This is display policy applied after reconstruction.
pub fn retain_min_duration(sessions: &mut Vec<Session>, min: chrono::Duration) {
    sessions.retain(|session| session.elapsed() > min);
}
