//! Sculptor CLI library.
//!
//! This crate provides the command-line interface for the focus tracker.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands, SessionsAction, UsageAction};
pub use config::Config;
