use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use sculptor_cli::commands::{
    Outcome, QueryContext, import, record, samples, sessions, status, usage,
};
use sculptor_cli::{Cli, Commands, Config, SessionsAction, UsageAction};

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(sculptor_db::Database, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = sculptor_db::Database::open(&config.database_path)
        .with_context(|| format!("failed to open {}", config.database_path.display()))?;
    Ok((db, config))
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // try_init: tests may have installed a subscriber already
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let Some(command) = cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(ExitCode::SUCCESS);
    };

    let (mut db, config) = open_database(cli.config.as_deref())?;
    let ctx = QueryContext::local(&config);
    let mut out = io::stdout().lock();

    let outcome = match command {
        Commands::Usage { action } => match action {
            UsageAction::Total(args) => usage::total(&mut out, &db, &ctx, &args)?,
            UsageAction::MostUsed(args) => usage::most_used(&mut out, &db, &ctx, &args)?,
            UsageAction::Apps(args) => usage::apps(&mut out, &db, &ctx, &args)?,
            UsageAction::Categories(args) => usage::categories(&mut out, &db, &ctx, &args)?,
        },
        Commands::Sessions { action } => match action {
            SessionsAction::List(args) => sessions::list(&mut out, &db, &ctx, &args)?,
            SessionsAction::Delete(args) => sessions::delete(&mut out, &mut db, &ctx, &args)?,
        },
        Commands::Samples(args) => samples::run(&mut out, &db, &ctx, &args)?,
        Commands::Record(args) => {
            let id = record::run(&mut db, args)?;
            writeln!(out, "Recorded sample {id}")?;
            Outcome::Found
        }
        Commands::Import => {
            let inserted = import::run(&mut db)?;
            writeln!(out, "Imported {inserted} samples")?;
            Outcome::Found
        }
        Commands::Status => {
            status::run(&mut out, &db, &config, chrono::Utc::now())?;
            Outcome::Found
        }
    };

    out.flush()?;
    Ok(match outcome {
        Outcome::Found => ExitCode::SUCCESS,
        Outcome::Empty => ExitCode::FAILURE,
    })
}
