//! Binary entry point for the readiness CLI.

use std::io::{self, Write};
use std::process;

use clap::Parser;
use thiserror::Error;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use readiness::{
    ConfigError, HarnessConfig, ProcessCommandRunner, Registry, RegistryError, ReportFormat,
    SuiteError, readiness_suite,
};

mod cli;

use cli::{Cli, OutputFormat, RunCommand};

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Suite(#[from] SuiteError),
    #[error("case selection failed: {0}")]
    Selection(#[from] RegistryError),
    #[error("failed to write report: {0}")]
    Output(#[from] io::Error),
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let exit_code = match dispatch(cli, &mut io::stdout().lock()) {
        Ok(code) => code,
        Err(err) => {
            report_error(&err);
            1
        }
    };

    process::exit(exit_code);
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr))
        .init();
}

fn dispatch(cli: Cli, out: &mut impl Write) -> Result<i32, CliError> {
    let config = HarnessConfig::load_without_cli_args()?;
    let registry = readiness_suite(&config, ProcessCommandRunner)?;
    match cli {
        Cli::Run(command) => run_suite(&registry, &command, out),
        Cli::List => {
            list_cases(&registry, out)?;
            Ok(0)
        }
    }
}

fn run_suite(
    registry: &Registry,
    command: &RunCommand,
    out: &mut impl Write,
) -> Result<i32, CliError> {
    let report = if command.cases.is_empty() {
        registry.run_all()
    } else {
        registry.run_selected(&command.cases)?
    };
    report.render(&mut *out, report_format(command.format))?;
    Ok(if report.is_success() { 0 } else { 1 })
}

fn list_cases(registry: &Registry, out: &mut impl Write) -> io::Result<()> {
    for name in registry.case_names() {
        writeln!(out, "{name}")?;
    }
    Ok(())
}

const fn report_format(format: OutputFormat) -> ReportFormat {
    match format {
        OutputFormat::Text => ReportFormat::Text,
        OutputFormat::Json => ReportFormat::Json,
    }
}

fn report_error(err: &CliError) {
    write_error(io::stderr(), err);
}

fn write_error(mut target: impl Write, err: &CliError) {
    writeln!(target, "readiness: {err}").ok();
}
