//! Storage layer for focus samples.
//!
//! Provides persistence for samples using `rusqlite` and implements
//! [`SampleSource`] so the query engine can read from it directly.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! A `Database` can be moved between threads but not shared without external
//! synchronization. The CLI opens one per command.
//!
//! # Schema
//!
//! Timestamps are stored as TEXT in RFC 3339 format with millisecond precision
//! and a `Z` suffix (e.g., `2025-01-15T10:30:00.000Z`). Fixed-width UTC values
//! make lexicographic ordering match chronological ordering, which range
//! queries rely on.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use sculptor_core::{Sample, SampleId, SampleSource};
use thiserror::Error;

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Failed to parse a stored sample timestamp.
    #[error("invalid timestamp for sample {sample_id}: {timestamp}")]
    TimestampParse {
        sample_id: String,
        timestamp: String,
        #[source]
        source: chrono::ParseError,
    },
    /// A stored or incoming sample could not be represented.
    #[error("invalid sample {sample_id}: {message}")]
    InvalidSample { sample_id: String, message: String },
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

/// A sample row as stored, before validation.
struct SampleRow {
    id: String,
    timestamp: String,
    application: String,
    process_id: i64,
    title: String,
    memory_usage: Option<i64>,
}

const SAMPLE_COLUMNS: &str = "id, timestamp, application, process_id, title, memory_usage";

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            -- One row per focus observation.
            -- timestamp: RFC 3339 UTC with milliseconds (e.g. '2025-01-15T10:30:00.000Z')
            CREATE TABLE IF NOT EXISTS samples (
                id TEXT PRIMARY KEY,
                timestamp TEXT NOT NULL,
                application TEXT NOT NULL,
                process_id INTEGER NOT NULL,
                title TEXT NOT NULL DEFAULT '',
                memory_usage INTEGER
            );

            CREATE INDEX IF NOT EXISTS idx_samples_timestamp ON samples(timestamp);
            CREATE INDEX IF NOT EXISTS idx_samples_application ON samples(application);
            ",
        )?;
        Ok(())
    }

    /// Inserts a batch of samples, ignoring duplicates by ID.
    ///
    /// Returns the number of rows actually inserted.
    pub fn insert_samples(&mut self, samples: &[Sample]) -> Result<usize, DbError> {
        if samples.is_empty() {
            return Ok(0);
        }
        let tx = self.conn.transaction()?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(
                "
                INSERT OR IGNORE INTO samples
                (id, timestamp, application, process_id, title, memory_usage)
                VALUES (?, ?, ?, ?, ?, ?)
                ",
            )?;
            for sample in samples {
                let memory_usage = sample
                    .memory_usage
                    .map(|bytes| {
                        i64::try_from(bytes).map_err(|_| DbError::InvalidSample {
                            sample_id: sample.id.to_string(),
                            message: format!("memory usage {bytes} out of range"),
                        })
                    })
                    .transpose()?;
                inserted += stmt.execute(params![
                    sample.id.as_str(),
                    format_timestamp(sample.timestamp),
                    sample.application_name,
                    i64::from(sample.process_id),
                    sample.title,
                    memory_usage,
                ])?;
            }
        }
        tx.commit()?;
        tracing::debug!(inserted, total = samples.len(), "inserted samples");
        Ok(inserted)
    }

    /// Lists all samples ordered by timestamp then ID.
    pub fn list_samples(&self) -> Result<Vec<Sample>, DbError> {
        let mut stmt = self.conn.prepare(&format!(
            "
            SELECT {SAMPLE_COLUMNS}
            FROM samples
            ORDER BY timestamp ASC, id ASC
            "
        ))?;
        let rows = stmt.query_map([], read_row)?;
        let mut samples = Vec::new();
        for row in rows {
            samples.push(row?.into_sample()?);
        }
        Ok(samples)
    }

    /// Lists samples within a time range.
    ///
    /// The range is inclusive of `start` and exclusive of `end`.
    pub fn list_samples_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Sample>, DbError> {
        if end <= start {
            return Ok(Vec::new());
        }
        let start = format_timestamp(start);
        let end = format_timestamp(end);
        let mut stmt = self.conn.prepare(&format!(
            "
            SELECT {SAMPLE_COLUMNS}
            FROM samples
            WHERE timestamp >= ? AND timestamp < ?
            ORDER BY timestamp ASC, id ASC
            "
        ))?;
        let rows = stmt.query_map([start, end], read_row)?;
        let mut samples = Vec::new();
        for row in rows {
            samples.push(row?.into_sample()?);
        }
        Ok(samples)
    }

    /// Counts stored samples.
    pub fn sample_count(&self) -> Result<usize, DbError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM samples", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// Returns the most recent sample, if any.
    pub fn last_sample(&self) -> Result<Option<Sample>, DbError> {
        let row = self
            .conn
            .query_row(
                &format!(
                    "
                    SELECT {SAMPLE_COLUMNS}
                    FROM samples
                    ORDER BY timestamp DESC, id DESC
                    LIMIT 1
                    "
                ),
                [],
                read_row,
            )
            .optional()?;
        row.map(SampleRow::into_sample).transpose()
    }

    /// Deletes samples by ID.
    ///
    /// Unknown IDs are ignored. Returns the number of rows removed.
    pub fn delete_samples(&mut self, ids: &[SampleId]) -> Result<usize, DbError> {
        if ids.is_empty() {
            return Ok(0);
        }
        let tx = self.conn.transaction()?;
        let mut deleted = 0;
        {
            let mut stmt = tx.prepare("DELETE FROM samples WHERE id = ?")?;
            for id in ids {
                deleted += stmt.execute([id.as_str()])?;
            }
        }
        tx.commit()?;
        tracing::debug!(deleted, requested = ids.len(), "deleted samples");
        Ok(deleted)
    }
}

impl SampleSource for Database {
    type Error = DbError;

    fn samples_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Sample>, Self::Error> {
        self.list_samples_in_range(start, end)
    }
}

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SampleRow> {
    Ok(SampleRow {
        id: row.get(0)?,
        timestamp: row.get(1)?,
        application: row.get(2)?,
        process_id: row.get(3)?,
        title: row.get(4)?,
        memory_usage: row.get(5)?,
    })
}

impl SampleRow {
    fn into_sample(self) -> Result<Sample, DbError> {
        let timestamp = parse_timestamp(&self.timestamp, &self.id)?;
        let process_id = u32::try_from(self.process_id).map_err(|_| DbError::InvalidSample {
            sample_id: self.id.clone(),
            message: format!("process id {} out of range", self.process_id),
        })?;
        let memory_usage = self
            .memory_usage
            .map(|bytes| {
                u64::try_from(bytes).map_err(|_| DbError::InvalidSample {
                    sample_id: self.id.clone(),
                    message: format!("negative memory usage {bytes}"),
                })
            })
            .transpose()?;
        let id = SampleId::new(self.id.clone()).map_err(|err| DbError::InvalidSample {
            sample_id: self.id,
            message: err.to_string(),
        })?;
        Ok(Sample {
            id,
            timestamp,
            application_name: self.application,
            process_id,
            title: self.title,
            memory_usage,
        })
    }
}

fn parse_timestamp(timestamp: &str, sample_id: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|source| DbError::TimestampParse {
            sample_id: sample_id.to_string(),
            timestamp: timestamp.to_string(),
            source,
        })
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}
