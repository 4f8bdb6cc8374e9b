//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use sculptor_core::{AggregationConfig, Calendar, CategoryTable, QueryConfig, SessionConfig};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file.
    pub database_path: PathBuf,

    /// Seconds of focus represented by one recorded sample.
    pub sample_interval_secs: u32,

    /// Split same-process sessions at gaps longer than this many seconds.
    /// Unset merges across any gap.
    pub session_gap_secs: Option<u64>,

    /// Sessions no longer than this are hidden from `sessions list`.
    pub min_session_secs: u64,

    /// Application → category table. Entries from config files extend the
    /// built-in table.
    pub categories: CategoryTable,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_path", &self.database_path)
            .field("sample_interval_secs", &self.sample_interval_secs)
            .field("session_gap_secs", &self.session_gap_secs)
            .field("min_session_secs", &self.min_session_secs)
            .field("categories", &self.categories.len())
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("sculptor.db"),
            sample_interval_secs: 1,
            session_gap_secs: None,
            min_session_secs: 60,
            categories: CategoryTable::default(),
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // SCULPTOR_DATABASE_PATH, SCULPTOR_MIN_SESSION_SECS, ...
        figment = figment.merge(Env::prefixed("SCULPTOR_"));

        figment.extract()
    }

    /// Builds the engine configuration for samples dated in `calendar`.
    pub fn query_config(&self, calendar: Calendar) -> QueryConfig {
        QueryConfig {
            aggregation: AggregationConfig {
                sample_interval_secs: self.sample_interval_secs,
                calendar,
            },
            sessions: SessionConfig {
                max_gap: self.session_gap_secs.map(seconds),
            },
            min_session: seconds(self.min_session_secs),
        }
    }
}

/// Converts configured seconds, saturating at the largest representable span.
fn seconds(secs: u64) -> chrono::Duration {
    i64::try_from(secs)
        .ok()
        .and_then(chrono::Duration::try_seconds)
        .unwrap_or(chrono::Duration::MAX)
}

/// Returns the platform-specific config directory for sculptor.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("sculptor"))
}

/// Returns the platform-specific data directory for sculptor.
///
/// On Linux: `~/.local/share/sculptor`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("sculptor"))
}
