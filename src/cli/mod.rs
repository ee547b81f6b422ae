//! Command-line interface definitions for the `readiness` binary.
//!
//! This module centralises the clap parser structures so both the main binary
//! and the build script can reuse them when generating the manual page.

use clap::{Parser, ValueEnum};

/// Top-level CLI for the `readiness` binary.
#[derive(Debug, Parser)]
#[command(
    name = "readiness",
    about = "Run the readiness acceptance suite against the local checkout",
    arg_required_else_help = true
)]
pub(crate) enum Cli {
    /// Run the suite, or selected cases, and print a report.
    #[command(name = "run", about = "Run the suite and report each case")]
    Run(RunCommand),
    /// List the registered cases without running them.
    #[command(name = "list", about = "List registered case names")]
    List,
}

/// Arguments for the `readiness run` subcommand.
#[derive(Debug, Parser)]
pub(crate) struct RunCommand {
    /// Run only the named case. May be repeated; names are the full
    /// `<group> <case>` strings printed by `readiness list`.
    #[arg(long = "case", value_name = "NAME")]
    pub(crate) cases: Vec<String>,
    /// Report format written to stdout.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub(crate) format: OutputFormat,
}

/// Report formats accepted by `--format`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// One line per case followed by a summary.
    #[default]
    Text,
    /// A single JSON document.
    Json,
}
