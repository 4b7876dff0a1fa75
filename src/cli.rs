// src/cli.rs

//! Command line of the `assetflow` binary.

use clap::{Parser, ValueEnum};

use crate::types::DEFAULT_TARGET;

/// Command-line arguments for `assetflow`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "assetflow",
    version,
    about = "Build, lint and format front-end assets with external tools.",
    long_about = None
)]
pub struct CliArgs {
    /// Task or alias to run (`build`, `lint`, `format`, `serve`,
    /// `styles-build`, a user alias, ...).
    #[arg(value_name = "TARGET", default_value = DEFAULT_TARGET)]
    pub target: String,

    /// TOML config file. Its directory becomes the project root.
    #[arg(long, value_name = "PATH", default_value = "assetflow.toml")]
    pub config: String,

    /// Only process files reported as modified by `git diff`. Not valid for
    /// the serve target.
    #[arg(short = 'd', long)]
    pub diff_only: bool,

    /// Exit with an error when a linter reports problems.
    #[arg(long)]
    pub fail_after_error: bool,

    /// Log verbosity; overrides `ASSETFLOW_LOG`.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Print the resolved tasks, target and watch rules without running
    /// anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Parse `std::env::args`, exiting with usage on error.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
