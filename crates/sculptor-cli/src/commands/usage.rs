//! Usage reports: totals, most used application, per-application and
//! per-category focus time.

use std::io::Write;

use anyhow::Result;
use chrono::NaiveDate;
use clap::Args;
use sculptor_core::{ApplicationUsage, CategoryUsage, Duration, Scope, UsageQuery};
use sculptor_db::Database;
use serde::Serialize;

use super::util::progress_bar;
use super::{Outcome, QueryContext, found};

/// Selects a single day.
#[derive(Debug, Args)]
pub struct DayArgs {
    /// Day to report (YYYY-MM-DD, M/D/YYYY, today, yesterday). Defaults to today.
    #[arg(long, conflicts_with = "yesterday")]
    pub date: Option<String>,

    /// Report the previous day.
    #[arg(long)]
    pub yesterday: bool,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Selects a day, or an inclusive date range with `--start`/`--end`.
#[derive(Debug, Args)]
pub struct AppsArgs {
    #[command(flatten)]
    pub day: DayArgs,

    /// First day of a range report. Replaces --date.
    #[arg(long, requires = "end", conflicts_with_all = ["date", "yesterday"])]
    pub start: Option<String>,

    /// Last day of a range report, inclusive.
    #[arg(long, requires = "start")]
    pub end: Option<String>,
}

/// Selects an inclusive date range.
#[derive(Debug, Args)]
pub struct RangeArgs {
    /// First day of the range. Defaults to today.
    #[arg(long)]
    pub start: Option<String>,

    /// Last day of the range, inclusive. Defaults to today.
    #[arg(long)]
    pub end: Option<String>,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Copy)]
enum Day {
    Today,
    Yesterday,
    On(NaiveDate),
}

impl Day {
    fn date(self, query: &UsageQuery<'_, Database>) -> NaiveDate {
        match self {
            Self::Today => query.today(),
            Self::Yesterday => query.yesterday(),
            Self::On(date) => date,
        }
    }
}

impl DayArgs {
    fn day(&self, ctx: &QueryContext<'_>) -> Result<Day> {
        if self.yesterday {
            return Ok(Day::Yesterday);
        }
        match self.date.as_deref() {
            Some(arg) => Ok(Day::On(ctx.date(Some(arg))?)),
            None => Ok(Day::Today),
        }
    }
}

#[derive(Debug, Serialize)]
struct TotalReport {
    date: NaiveDate,
    usage: Duration,
}

#[derive(Debug, Serialize)]
struct MostUsedReport {
    date: NaiveDate,
    application: String,
    usage: Duration,
}

#[derive(Debug, Serialize)]
struct ApplicationsReport {
    start: NaiveDate,
    end: NaiveDate,
    applications: Vec<ApplicationUsage>,
}

#[derive(Debug, Serialize)]
struct CategoriesReport {
    start: NaiveDate,
    end: NaiveDate,
    categories: CategoryUsage,
}

fn no_samples<W: Write>(writer: &mut W, scope: Scope) -> Result<Outcome> {
    writeln!(writer, "No samples recorded for {scope}.")?;
    Ok(Outcome::Empty)
}

/// Runs `usage total`.
pub fn total<W: Write>(
    writer: &mut W,
    db: &Database,
    ctx: &QueryContext<'_>,
    args: &DayArgs,
) -> Result<Outcome> {
    let query = ctx.query(db);
    let day = args.day(ctx)?;
    let result = match day {
        Day::Today => query.total_usage_today(),
        Day::Yesterday => query.total_usage_yesterday(),
        Day::On(date) => query.total_usage(date),
    };
    let date = day.date(&query);
    let Some(usage) = found(result)? else {
        return no_samples(writer, Scope::day(date));
    };

    if args.json {
        let report = TotalReport { date, usage };
        writeln!(writer, "{}", serde_json::to_string_pretty(&report)?)?;
    } else {
        writeln!(writer, "Total focus time on {date}: {usage}")?;
    }
    Ok(Outcome::Found)
}

/// Runs `usage most-used`.
pub fn most_used<W: Write>(
    writer: &mut W,
    db: &Database,
    ctx: &QueryContext<'_>,
    args: &DayArgs,
) -> Result<Outcome> {
    let query = ctx.query(db);
    let day = args.day(ctx)?;
    let result = match day {
        Day::Today => query.most_used_today(),
        Day::Yesterday => query.most_used_yesterday(),
        Day::On(date) => query.most_used(date),
    };
    let date = day.date(&query);
    let Some(most) = found(result)? else {
        return no_samples(writer, Scope::day(date));
    };

    if args.json {
        let report = MostUsedReport {
            date,
            application: most.application,
            usage: most.usage,
        };
        writeln!(writer, "{}", serde_json::to_string_pretty(&report)?)?;
    } else {
        writeln!(
            writer,
            "Most used on {date}: {} ({})",
            most.application, most.usage
        )?;
    }
    Ok(Outcome::Found)
}

/// Runs `usage apps`.
pub fn apps<W: Write>(
    writer: &mut W,
    db: &Database,
    ctx: &QueryContext<'_>,
    args: &AppsArgs,
) -> Result<Outcome> {
    let query = ctx.query(db);
    let scope = match (args.start.as_deref(), args.end.as_deref()) {
        (Some(start), Some(end)) => Scope::range(ctx.date(Some(start))?, ctx.date(Some(end))?),
        _ => Scope::day(args.day.day(ctx)?.date(&query)),
    };
    let Some(applications) =
        found(query.application_usage_between(scope.start(), scope.end()))?
    else {
        return no_samples(writer, scope);
    };

    if args.day.json {
        let report = ApplicationsReport {
            start: scope.start(),
            end: scope.end(),
            applications,
        };
        writeln!(writer, "{}", serde_json::to_string_pretty(&report)?)?;
        return Ok(Outcome::Found);
    }

    writeln!(writer, "Applications on {scope}")?;
    let max = applications
        .first()
        .map_or(0, |app| app.usage.total_seconds());
    for app in &applications {
        let bar = progress_bar(app.usage.total_seconds(), max);
        writeln!(writer, "{bar}  {:<24} {}", app.application, app.usage)?;
    }
    let total: Duration = applications.iter().map(|app| app.usage).sum();
    writeln!(writer, "Total: {total}")?;
    Ok(Outcome::Found)
}

/// Runs `usage categories`.
pub fn categories<W: Write>(
    writer: &mut W,
    db: &Database,
    ctx: &QueryContext<'_>,
    args: &RangeArgs,
) -> Result<Outcome> {
    let start = ctx.date(args.start.as_deref())?;
    let end = ctx.date(args.end.as_deref())?;
    let query = ctx.query(db);
    let Some(categories) = found(query.category_usage(start, end))? else {
        return no_samples(writer, Scope::range(start, end));
    };

    if args.json {
        let report = CategoriesReport {
            start,
            end,
            categories,
        };
        writeln!(writer, "{}", serde_json::to_string_pretty(&report)?)?;
        return Ok(Outcome::Found);
    }

    writeln!(writer, "Categories for {}", Scope::range(start, end))?;
    let max = categories
        .values()
        .map(Duration::total_seconds)
        .max()
        .unwrap_or(0);
    for (category, usage) in &categories {
        let bar = progress_bar(usage.total_seconds(), max);
        writeln!(writer, "{bar}  {category:<16} {usage}")?;
    }
    Ok(Outcome::Found)
}
