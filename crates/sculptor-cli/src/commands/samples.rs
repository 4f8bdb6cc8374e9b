//! Recent samples for a day.

use std::io::Write;

use anyhow::Result;
use clap::Args;
use sculptor_core::Scope;
use sculptor_db::Database;

use super::{Outcome, QueryContext, found};

#[derive(Debug, Args)]
pub struct SamplesArgs {
    /// Day to show (YYYY-MM-DD, M/D/YYYY, today, yesterday). Defaults to today.
    #[arg(long)]
    pub date: Option<String>,

    /// Maximum number of samples to show.
    #[arg(long, default_value_t = 10)]
    pub limit: usize,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Runs `samples`, newest first.
pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    ctx: &QueryContext<'_>,
    args: &SamplesArgs,
) -> Result<Outcome> {
    let date = ctx.date(args.date.as_deref())?;
    let query = ctx.query(db);
    let Some(samples) = found(query.recent_samples(date, args.limit))? else {
        writeln!(writer, "No samples recorded for {}.", Scope::day(date))?;
        return Ok(Outcome::Empty);
    };

    if args.json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&samples)?)?;
        return Ok(Outcome::Found);
    }

    for sample in &samples {
        let time = ctx.calendar.local_time(sample.timestamp).format("%H:%M:%S");
        let line = format!(
            "{time}  {:<24} pid {:<7} {}",
            sample.application_name, sample.process_id, sample.title
        );
        writeln!(writer, "{}", line.trim_end())?;
    }
    Ok(Outcome::Found)
}
