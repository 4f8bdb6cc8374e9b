//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::record::RecordArgs;
use crate::commands::samples::SamplesArgs;
use crate::commands::sessions::{DeleteArgs, ListArgs};
use crate::commands::usage::{AppsArgs, DayArgs, RangeArgs};

/// Focus-time tracker.
///
/// Stores foreground-window samples and reports how time was spent per day,
/// per application, per category and per session.
#[derive(Debug, Parser)]
#[command(name = "sculptor", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Report focus time.
    Usage {
        #[command(subcommand)]
        action: UsageAction,
    },

    /// List or delete focus sessions.
    Sessions {
        #[command(subcommand)]
        action: SessionsAction,
    },

    /// Show the most recent samples for a day.
    Samples(SamplesArgs),

    /// Record one focus sample.
    Record(RecordArgs),

    /// Import samples from JSONL on stdin.
    Import,

    /// Show database status.
    Status,
}

/// Usage reports.
#[derive(Debug, Subcommand)]
pub enum UsageAction {
    /// Total focus time for a day.
    Total(DayArgs),

    /// The application with the most focus time on a day.
    MostUsed(DayArgs),

    /// Focus time per application for a day or a date range.
    Apps(AppsArgs),

    /// Focus time per category across a date range.
    Categories(RangeArgs),
}

/// Session operations.
#[derive(Debug, Subcommand)]
pub enum SessionsAction {
    /// List sessions for a day.
    List(ListArgs),

    /// Delete a session and all of its samples.
    Delete(DeleteArgs),
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_usage_total_with_yesterday() {
        let cli = Cli::try_parse_from(["sculptor", "usage", "total", "--yesterday", "--json"]).unwrap();
        match cli.command {
            Some(Commands::Usage {
                action: UsageAction::Total(args),
            }) => {
                assert!(args.yesterday);
                assert!(args.json);
                assert!(args.date.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn date_and_yesterday_conflict() {
        let result = Cli::try_parse_from([
            "sculptor",
            "usage",
            "most-used",
            "--date",
            "2025-01-15",
            "--yesterday",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn apps_range_needs_both_ends_and_no_date() {
        let cli = Cli::try_parse_from([
            "sculptor", "usage", "apps", "--start", "2025-01-01", "--end", "2025-01-31",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Usage {
                action: UsageAction::Apps(args),
            }) => {
                assert_eq!(args.start.as_deref(), Some("2025-01-01"));
                assert_eq!(args.end.as_deref(), Some("2025-01-31"));
            }
            other => panic!("unexpected command: {other:?}"),
        }

        for bad in [
            &["sculptor", "usage", "apps", "--start", "2025-01-01"][..],
            &["sculptor", "usage", "apps", "--start", "2025-01-01", "--end", "2025-01-02", "--yesterday"],
        ] {
            assert!(Cli::try_parse_from(bad).is_err(), "{bad:?}");
        }
    }

    #[test]
    fn parses_sessions_delete() {
        let cli = Cli::try_parse_from(["sculptor", "sessions", "delete", "abc", "--date", "1/15/2025"])
            .unwrap();
        match cli.command {
            Some(Commands::Sessions {
                action: SessionsAction::Delete(args),
            }) => {
                assert_eq!(args.id, "abc");
                assert_eq!(args.date.as_deref(), Some("1/15/2025"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
