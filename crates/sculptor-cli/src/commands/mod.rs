//! CLI subcommand implementations.

pub mod import;
pub mod record;
pub mod samples;
pub mod sessions;
pub mod status;
pub mod usage;
pub mod util;

use chrono::NaiveDate;
use sculptor_core::{Calendar, CoreError, UsageQuery};
use sculptor_db::Database;

use crate::Config;

/// Whether a command found data to report.
///
/// `Empty` is not a failure, but the process still exits non-zero so scripts
/// can tell "no samples" apart from a zero total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Found,
    Empty,
}

/// Calendar settings shared by the query commands.
#[derive(Debug, Clone, Copy)]
pub struct QueryContext<'a> {
    pub config: &'a Config,
    /// Places samples on calendar dates.
    pub calendar: Calendar,
    /// The date `today` and `yesterday` resolve against.
    pub today: NaiveDate,
}

impl<'a> QueryContext<'a> {
    /// Uses the machine's time zone and current date.
    pub fn local(config: &'a Config) -> Self {
        let calendar = Calendar::Local;
        Self {
            config,
            calendar,
            today: calendar.today(),
        }
    }

    pub fn query<'q>(&'q self, db: &'q Database) -> UsageQuery<'q, Database> {
        UsageQuery::new(
            db,
            &self.config.categories,
            self.config.query_config(self.calendar),
        )
        .with_today(self.today)
    }

    /// Resolves an optional `--date` argument, defaulting to today.
    pub fn date(&self, arg: Option<&str>) -> anyhow::Result<NaiveDate> {
        arg.map_or(Ok(self.today), |s| util::parse_date(s, self.today))
    }
}

/// Separates the "no samples" outcome from real failures.
pub(crate) fn found<T>(result: Result<T, CoreError>) -> anyhow::Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.is_not_found() => Ok(None),
        Err(err) => Err(err.into()),
    }
}
