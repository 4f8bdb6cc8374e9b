//! Session listing and deletion.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::Args;
use sculptor_core::{Calendar, Duration, Scope, Session, SessionId};
use sculptor_db::Database;
use serde::Serialize;

use super::{Outcome, QueryContext, found};

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Day to list (YYYY-MM-DD, M/D/YYYY, today, yesterday). Defaults to today.
    #[arg(long)]
    pub date: Option<String>,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Session ID as shown by `sessions list`.
    pub id: String,

    /// Day the session is listed on. Defaults to today. A session that runs
    /// across midnight is deleted on both sides.
    #[arg(long)]
    pub date: Option<String>,
}

/// Session summary without its member samples.
#[derive(Debug, Serialize)]
struct SessionSummary<'a> {
    id: &'a SessionId,
    process_id: u32,
    owner_name: &'a str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    elapsed: Duration,
    samples: usize,
}

impl<'a> From<&'a Session> for SessionSummary<'a> {
    fn from(session: &'a Session) -> Self {
        Self {
            id: &session.id,
            process_id: session.process_id,
            owner_name: &session.owner_name,
            start: session.start,
            end: session.end,
            elapsed: session.elapsed_duration(),
            samples: session.samples.len(),
        }
    }
}

#[derive(Debug, Serialize)]
struct SessionsReport<'a> {
    date: NaiveDate,
    sessions: Vec<SessionSummary<'a>>,
}

fn clock(timestamp: DateTime<Utc>, calendar: Calendar) -> String {
    calendar.local_time(timestamp).format("%H:%M:%S").to_string()
}

/// Runs `sessions list`.
pub fn list<W: Write>(
    writer: &mut W,
    db: &Database,
    ctx: &QueryContext<'_>,
    args: &ListArgs,
) -> Result<Outcome> {
    let date = ctx.date(args.date.as_deref())?;
    let query = ctx.query(db);
    let Some(sessions) = found(query.sessions(date))? else {
        writeln!(writer, "No samples recorded for {}.", Scope::day(date))?;
        return Ok(Outcome::Empty);
    };

    if args.json {
        let report = SessionsReport {
            date,
            sessions: sessions.iter().map(SessionSummary::from).collect(),
        };
        writeln!(writer, "{}", serde_json::to_string_pretty(&report)?)?;
        return Ok(Outcome::Found);
    }

    writeln!(writer, "Sessions on {date}")?;
    if sessions.is_empty() {
        writeln!(
            writer,
            "(no sessions longer than {}s)",
            ctx.config.min_session_secs
        )?;
        return Ok(Outcome::Found);
    }
    for session in &sessions {
        writeln!(
            writer,
            "{}  {}-{}  {:<24} {}",
            session.id,
            clock(session.start, ctx.calendar),
            clock(session.end, ctx.calendar),
            session.owner_name,
            session.elapsed_duration()
        )?;
    }
    Ok(Outcome::Found)
}

/// Runs `sessions delete`.
///
/// The ID is resolved against the same per-day reconstruction `sessions list`
/// uses, then every member sample is removed from the store.
pub fn delete<W: Write>(
    writer: &mut W,
    db: &mut Database,
    ctx: &QueryContext<'_>,
    args: &DeleteArgs,
) -> Result<Outcome> {
    let id = SessionId::new(args.id.trim()).context("invalid session ID")?;
    let date = ctx.date(args.date.as_deref())?;

    let session = {
        let query = ctx.query(db);
        found(query.find_session(date, &id))?
    };
    let Some(session) = session else {
        writeln!(writer, "No session {id} on {date}.")?;
        return Ok(Outcome::Empty);
    };

    let deleted = db.delete_samples(&session.sample_ids())?;
    tracing::debug!(session = %id, deleted, "deleted session");
    writeln!(
        writer,
        "Deleted session {id} ({}, {deleted} samples)",
        session.owner_name
    )?;
    Ok(Outcome::Found)
}
