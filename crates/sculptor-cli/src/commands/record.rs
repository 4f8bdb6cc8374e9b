//! Record a single focus sample, as a capture hook would.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;
use sculptor_core::{Sample, SampleId};
use sculptor_db::Database;

use super::util::parse_datetime;

#[derive(Debug, Args)]
pub struct RecordArgs {
    /// Owning application name of the focused window.
    #[arg(long)]
    pub app: String,

    /// Process ID of the focused window's owner.
    #[arg(long)]
    pub pid: u32,

    /// Window title.
    #[arg(long, default_value = "")]
    pub title: String,

    /// Resident memory of the owning process in bytes.
    #[arg(long)]
    pub memory: Option<u64>,

    /// Observation time (RFC 3339 or e.g. '5 seconds ago'). Defaults to now.
    #[arg(long)]
    pub at: Option<String>,
}

impl RecordArgs {
    fn into_sample(self) -> Result<Sample> {
        let app = self.app.trim();
        if app.is_empty() {
            anyhow::bail!("application name cannot be empty");
        }
        let timestamp = match self.at.as_deref() {
            Some(at) => parse_datetime(at).context("invalid --at")?,
            None => Utc::now(),
        };
        Ok(Sample {
            id: SampleId::generate(),
            timestamp,
            application_name: app.to_string(),
            process_id: self.pid,
            title: self.title,
            memory_usage: self.memory,
        })
    }
}

/// Stores one sample and returns its ID.
pub fn run(db: &mut Database, args: RecordArgs) -> Result<SampleId> {
    let sample = args.into_sample()?;
    let id = sample.id.clone();
    db.insert_samples(std::slice::from_ref(&sample))?;
    tracing::debug!(sample = %id, app = %sample.application_name, "recorded sample");
    Ok(id)
}
