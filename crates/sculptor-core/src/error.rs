//! Error types for sculptor-core.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::types::ValidationError;

/// Errors returned by the usage engine.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A caller-supplied value was malformed (bad date, negative seconds, ...).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Samples were not sorted ascending by timestamp.
    #[error("sample {index} at {current} precedes the previous sample at {previous}")]
    OutOfOrderInput {
        index: usize,
        previous: DateTime<Utc>,
        current: DateTime<Utc>,
    },

    /// No samples exist for the requested scope.
    #[error("no samples recorded for {0}")]
    NotFound(String),

    /// The sample source failed to deliver samples.
    #[error("sample source error: {0}")]
    Source(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl CoreError {
    /// Returns true for the "no data" outcome, as opposed to a failure.
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<ValidationError> for CoreError {
    fn from(err: ValidationError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

/// Result type alias for sculptor-core.
pub type Result<T> = std::result::Result<T, CoreError>;
