//! Status command for checking that samples are being recorded.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Utc};

use sculptor_db::Database;

use crate::Config;

pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    config: &Config,
    now: DateTime<Utc>,
) -> Result<()> {
    let count = db.sample_count()?;

    writeln!(writer, "Sculptor status")?;
    writeln!(writer, "Database: {}", config.database_path.display())?;
    writeln!(writer, "Samples: {count}")?;

    let Some(last) = db.last_sample()? else {
        writeln!(writer, "No samples recorded.")?;
        return Ok(());
    };

    let age = (now - last.timestamp).num_seconds().max(0);
    writeln!(
        writer,
        "Last sample: {} ({}, pid {}), {age}s ago",
        last.timestamp.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        last.application_name,
        last.process_id
    )?;
    Ok(())
}
