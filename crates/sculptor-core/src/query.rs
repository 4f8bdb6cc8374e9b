//! Date-scoped usage queries over an injected sample source.
//!
//! [`UsageQuery`] is the read-only surface callers use. It asks a
//! [`SampleSource`] for the samples covering a scope, validates their order,
//! and hands them to the aggregator or the session reconstructor. Every
//! operation reports [`CoreError::NotFound`] when the scope holds no samples,
//! so "no data" never masquerades as a zero duration.

use chrono::{DateTime, Days, NaiveDate, Utc};

use crate::aggregate::{self, AggregationConfig, ApplicationUsage, CategoryUsage};
use crate::category::CategoryTable;
use crate::duration::Duration;
use crate::error::CoreError;
use crate::sample::{Sample, ensure_ordered};
use crate::scope::{Calendar, Scope};
use crate::session::{self, Session, SessionConfig};
use crate::types::SessionId;

/// A store that can deliver samples for a time window.
///
/// This trait keeps persistence out of the engine (e.g., the `SQLite` store
/// in sculptor-db, or in-memory fixtures in tests).
pub trait SampleSource {
    /// Error raised by the underlying store.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns samples with `start <= timestamp < end`, ascending by timestamp.
    fn samples_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Sample>, Self::Error>;
}

/// Configuration for a [`UsageQuery`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryConfig {
    pub aggregation: AggregationConfig,
    pub sessions: SessionConfig,
    /// Sessions no longer than this are hidden from session listings.
    /// Default: 60 seconds.
    pub min_session: chrono::Duration,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            aggregation: AggregationConfig::default(),
            sessions: SessionConfig::default(),
            min_session: chrono::Duration::seconds(60),
        }
    }
}

/// Read-only usage queries for one reference day.
pub struct UsageQuery<'a, S> {
    source: &'a S,
    categories: &'a CategoryTable,
    config: QueryConfig,
    today: NaiveDate,
}

impl<'a, S: SampleSource> UsageQuery<'a, S> {
    /// Creates a query surface whose "today" is the current date in the
    /// configured calendar.
    pub fn new(source: &'a S, categories: &'a CategoryTable, config: QueryConfig) -> Self {
        let today = config.aggregation.calendar.today();
        Self {
            source,
            categories,
            config,
            today,
        }
    }

    /// Overrides the reference date used by the today/yesterday operations.
    #[must_use]
    pub const fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub const fn today(&self) -> NaiveDate {
        self.today
    }

    /// The calendar day before [`Self::today`].
    pub fn yesterday(&self) -> NaiveDate {
        self.today
            .checked_sub_days(Days::new(1))
            .unwrap_or(self.today)
    }

    pub const fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Total focus time on `date`.
    pub fn total_usage(&self, date: NaiveDate) -> Result<Duration, CoreError> {
        let scope = Scope::day(date);
        let samples = self.load(scope)?;
        aggregate::total_usage(&samples, &scope, &self.config.aggregation)
            .ok_or_else(|| not_found(scope))
    }

    pub fn total_usage_today(&self) -> Result<Duration, CoreError> {
        self.total_usage(self.today)
    }

    pub fn total_usage_yesterday(&self) -> Result<Duration, CoreError> {
        self.total_usage(self.yesterday())
    }

    /// The application with the most focus time on `date`.
    pub fn most_used(&self, date: NaiveDate) -> Result<ApplicationUsage, CoreError> {
        let scope = Scope::day(date);
        let samples = self.load(scope)?;
        aggregate::most_used_application(&samples, &scope, &self.config.aggregation)
            .ok_or_else(|| not_found(scope))
    }

    pub fn most_used_today(&self) -> Result<ApplicationUsage, CoreError> {
        self.most_used(self.today)
    }

    pub fn most_used_yesterday(&self) -> Result<ApplicationUsage, CoreError> {
        self.most_used(self.yesterday())
    }

    /// Focus time per application on `date`, most used first.
    ///
    /// Applications with equal usage keep their first-appearance order.
    pub fn application_usage(&self, date: NaiveDate) -> Result<Vec<ApplicationUsage>, CoreError> {
        self.application_usage_between(date, date)
    }

    /// Focus time per application across the inclusive range `start..=end`,
    /// most used first.
    pub fn application_usage_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ApplicationUsage>, CoreError> {
        let scope = Scope::range(start, end);
        let samples = self.load(scope)?;
        let mut usage = aggregate::per_application_usage(&samples, &scope, &self.config.aggregation);
        usage.sort_by_key(|app| std::cmp::Reverse(app.usage.total_seconds()));
        Ok(usage)
    }

    /// Focus time per category across the inclusive range `start..=end`.
    pub fn category_usage(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<CategoryUsage, CoreError> {
        let scope = Scope::range(start, end);
        let samples = self.load(scope)?;
        Ok(aggregate::category_usage_by_range(
            &samples,
            &scope,
            self.categories,
            &self.config.aggregation,
        ))
    }

    /// Sessions on `date` longer than the configured minimum.
    ///
    /// Returns an empty list (not `NotFound`) when samples exist but every
    /// session is too short to show.
    pub fn sessions(&self, date: NaiveDate) -> Result<Vec<Session>, CoreError> {
        let mut sessions = self.all_sessions(date)?;
        session::retain_min_duration(&mut sessions, self.config.min_session);
        Ok(sessions)
    }

    /// Finds a session listed on `date` by ID, ignoring the minimum-duration
    /// filter.
    ///
    /// A run that crosses midnight is listed in part on each day it touches.
    /// The returned session is the whole run as seen across the neighbouring
    /// days, so deleting it leaves no fragment behind on either side.
    pub fn find_session(&self, date: NaiveDate, id: &SessionId) -> Result<Session, CoreError> {
        let listed = self
            .all_sessions(date)?
            .into_iter()
            .find(|session| &session.id == id)
            .ok_or_else(|| CoreError::NotFound(format!("session {id} on {}", Scope::day(date))))?;
        let Some(first) = listed.samples.first().map(|sample| sample.id.clone()) else {
            return Ok(listed);
        };

        let around = Scope::range(
            date.checked_sub_days(Days::new(1)).unwrap_or(date),
            date.checked_add_days(Days::new(1)).unwrap_or(date),
        );
        let whole = session::reconstruct(self.load(around)?, &self.config.sessions)?
            .into_iter()
            .find(|session| session.samples.iter().any(|sample| sample.id == first));
        Ok(whole.unwrap_or(listed))
    }

    /// The newest `limit` samples on `date`, newest first.
    pub fn recent_samples(&self, date: NaiveDate, limit: usize) -> Result<Vec<Sample>, CoreError> {
        let mut samples = self.load(Scope::day(date))?;
        samples.reverse();
        samples.truncate(limit);
        Ok(samples)
    }

    fn all_sessions(&self, date: NaiveDate) -> Result<Vec<Session>, CoreError> {
        let samples = self.load(Scope::day(date))?;
        session::reconstruct(samples, &self.config.sessions)
    }

    /// Fetches, validates and scopes the samples for `scope`.
    fn load(&self, scope: Scope) -> Result<Vec<Sample>, CoreError> {
        let calendar = self.config.aggregation.calendar;
        let Some((start, end)) = scope.utc_bounds(calendar) else {
            return Err(not_found(scope));
        };

        let samples = self
            .source
            .samples_between(start, end)
            .map_err(|err| CoreError::Source(Box::new(err)))?;
        ensure_ordered(&samples)?;

        let samples: Vec<Sample> = samples
            .into_iter()
            .filter(|sample| scope.contains(sample.date_in(calendar)))
            .collect();
        if samples.is_empty() {
            return Err(not_found(scope));
        }
        Ok(samples)
    }
}

fn not_found(scope: Scope) -> CoreError {
    CoreError::NotFound(scope.to_string())
}
