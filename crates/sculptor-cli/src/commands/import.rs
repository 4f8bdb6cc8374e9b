//! Import command for loading samples into the local `SQLite` store.
//!
//! Input is JSONL, one sample per line. Two shapes are accepted:
//!
//! - flat: `{"timestamp": ..., "application_name": "Code", "process_id": 42}`
//! - capture records: `{"timestamp": ..., "owner": {"name": "Code", "processId": 42},
//!   "title": ..., "memoryUsage": ...}`
//!
//! Timestamps may be RFC 3339 strings, epoch milliseconds, or `{"$date": ...}`
//! wrappers as produced by document-store exports.

use std::io::{self, BufRead};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sculptor_core::{Sample, SampleId};
use sculptor_db::Database;
use serde::Deserialize;

/// Reads samples from stdin and stores them, returning the number inserted.
pub fn run(db: &mut Database) -> Result<usize> {
    let stdin = io::stdin();
    let samples = parse_samples(stdin.lock())?;
    let inserted = db.insert_samples(&samples)?;
    tracing::debug!(parsed = samples.len(), inserted, "imported samples");
    Ok(inserted)
}

fn parse_samples<R: BufRead>(reader: R) -> Result<Vec<Sample>> {
    let mut samples = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("failed to read line {}", idx + 1))?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let parsed: ImportSample = serde_json::from_str(trimmed)
            .with_context(|| format!("invalid JSON on line {}", idx + 1))?;
        let sample = parsed
            .into_sample()
            .with_context(|| format!("invalid sample on line {}", idx + 1))?;
        samples.push(sample);
    }
    Ok(samples)
}

#[derive(Debug, Deserialize)]
struct ImportSample {
    #[serde(default, alias = "_id")]
    id: Option<String>,
    timestamp: ImportTimestamp,
    #[serde(default, alias = "applicationName")]
    application_name: Option<String>,
    #[serde(default, alias = "processId")]
    process_id: Option<u32>,
    #[serde(default)]
    owner: Option<ImportOwner>,
    #[serde(default)]
    title: String,
    #[serde(default, alias = "memoryUsage")]
    memory_usage: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ImportOwner {
    name: String,
    #[serde(alias = "processId")]
    process_id: u32,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ImportTimestamp {
    Text(String),
    Millis(i64),
    Wrapped {
        #[serde(rename = "$date")]
        date: Box<ImportTimestamp>,
    },
}

impl ImportTimestamp {
    fn resolve(self) -> Result<DateTime<Utc>> {
        match self {
            Self::Text(text) => DateTime::parse_from_rfc3339(text.trim())
                .map(|parsed| parsed.with_timezone(&Utc))
                .with_context(|| format!("invalid timestamp {text:?}")),
            Self::Millis(millis) => DateTime::from_timestamp_millis(millis)
                .with_context(|| format!("timestamp {millis} out of range")),
            Self::Wrapped { date } => date.resolve(),
        }
    }
}

impl ImportSample {
    fn into_sample(self) -> Result<Sample> {
        let (owner_name, owner_pid) = match self.owner {
            Some(owner) => (Some(owner.name), Some(owner.process_id)),
            None => (None, None),
        };
        let application_name = self
            .application_name
            .or(owner_name)
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| anyhow::anyhow!("missing application name"))?;
        let process_id = self
            .process_id
            .or(owner_pid)
            .ok_or_else(|| anyhow::anyhow!("missing process id"))?;
        let id = match self.id {
            Some(id) if !id.trim().is_empty() => SampleId::new(id)?,
            _ => SampleId::generate(),
        };
        Ok(Sample {
            id,
            timestamp: self.timestamp.resolve()?,
            application_name,
            process_id,
            title: self.title,
            memory_usage: self.memory_usage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Cursor;

    use chrono::TimeZone;

    #[test]
    fn parse_samples_accepts_flat_records() {
        let input = r#"{"id":"s-1","timestamp":"2025-01-15T09:00:00Z","application_name":"Code","process_id":42,"title":"main.rs"}"#;
        let samples = parse_samples(Cursor::new(input)).unwrap();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].id.as_str(), "s-1");
        assert_eq!(samples[0].application_name, "Code");
        assert_eq!(samples[0].process_id, 42);
        assert_eq!(samples[0].title, "main.rs");
        assert_eq!(samples[0].memory_usage, None);
    }

    #[test]
    fn parse_samples_accepts_capture_records() {
        let input = concat!(
            r#"{"_id":"abc","title":"Inbox","owner":{"name":"Slack","processId":7},"memoryUsage":2048,"timestamp":{"$date":"2025-01-15T09:00:01.500Z"}}"#,
            "\n\n",
            r#"{"owner":{"name":"Code","processId":9},"timestamp":1736931600000}"#,
            "\n",
        );
        let samples = parse_samples(Cursor::new(input)).unwrap();
        assert_eq!(samples.len(), 2);

        assert_eq!(samples[0].id.as_str(), "abc");
        assert_eq!(samples[0].application_name, "Slack");
        assert_eq!(samples[0].process_id, 7);
        assert_eq!(samples[0].memory_usage, Some(2048));
        assert_eq!(
            samples[0].timestamp,
            Utc.with_ymd_and_hms(2025, 1, 15, 9, 0, 1).unwrap() + chrono::Duration::milliseconds(500)
        );

        assert_eq!(samples[1].application_name, "Code");
        assert_eq!(
            samples[1].timestamp,
            Utc.with_ymd_and_hms(2025, 1, 15, 9, 0, 0).unwrap()
        );
        assert_eq!(samples[1].id.as_str().len(), 36);
    }

    #[test]
    fn parse_samples_reports_line_numbers() {
        let input = concat!(
            r#"{"timestamp":"2025-01-15T09:00:00Z","application_name":"Code","process_id":1}"#,
            "\n",
            r#"{"timestamp":"2025-01-15T09:00:01Z","process_id":1}"#,
        );
        let err = parse_samples(Cursor::new(input)).unwrap_err();
        assert!(err.to_string().contains("invalid sample on line 2"));

        let err = parse_samples(Cursor::new("not json")).unwrap_err();
        assert!(err.to_string().contains("invalid JSON on line 1"));
    }

    #[test]
    fn parse_samples_rejects_bad_timestamps() {
        let input = r#"{"timestamp":"15/01/2025","application_name":"Code","process_id":1}"#;
        assert!(parse_samples(Cursor::new(input)).is_err());
    }

    #[test]
    fn import_is_idempotent_for_records_with_ids() {
        let input = r#"{"id":"s-1","timestamp":"2025-01-15T09:00:00Z","application_name":"Code","process_id":42}"#;
        let mut db = Database::open_in_memory().unwrap();
        let samples = parse_samples(Cursor::new(input)).unwrap();
        assert_eq!(db.insert_samples(&samples).unwrap(), 1);
        let samples = parse_samples(Cursor::new(input)).unwrap();
        assert_eq!(db.insert_samples(&samples).unwrap(), 0);
    }
}
