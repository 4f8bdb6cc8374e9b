//! Core domain logic for the focus tracker.
//!
//! This crate contains the fundamental types and logic for:
//! - Sessions: grouping focus samples into per-process runs
//! - Aggregation: total, per-application and per-category focus time
//! - Queries: date-scoped operations over an injected [`SampleSource`]
//!
//! Nothing here touches storage or the clock except [`Calendar::today`],
//! which [`UsageQuery::new`] calls once.

pub mod aggregate;
pub mod category;
mod duration;
mod error;
pub mod query;
mod sample;
pub mod scope;
pub mod session;
pub mod types;

pub use aggregate::{AggregationConfig, ApplicationUsage, CategoryUsage};
pub use category::{CategoryTable, OTHER_CATEGORY};
pub use duration::Duration;
pub use error::{CoreError, Result};
pub use query::{QueryConfig, SampleSource, UsageQuery};
pub use sample::{Sample, ensure_ordered};
pub use scope::{Calendar, Scope, parse_date_key};
pub use session::{Session, SessionConfig};
pub use types::{SampleId, SessionId, ValidationError};
