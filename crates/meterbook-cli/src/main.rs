//! # meterbook CLI entry point
//!
//! Parses command-line arguments, loads configuration, initializes
//! logging, and dispatches to subcommand handlers.
//!
//! Exit status: `0` success, `1` invalid input (a meter with violations,
//! a rejected pattern), `2` operational error.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use meterbook_cli::config::{LogConfig, MeterbookConfig};
use meterbook_cli::pattern::{run_check_pattern, CheckPatternArgs};
use meterbook_cli::presets::{run_presets, PresetsArgs};
use meterbook_cli::validate::{run_validate, ValidateArgs};

/// Meterbook: meter configuration validation.
///
/// Validates field-device records against per-model catalogue schemas as
/// they move through the intake, connection, staging and deployment stages.
#[derive(Parser, Debug)]
#[command(name = "meterbook", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate meter documents against a catalogue.
    Validate(ValidateArgs),

    /// Check a regular expression against pattern admission rules.
    CheckPattern(CheckPatternArgs),

    /// List built-in catalogue presets.
    Presets(PresetsArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match MeterbookConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(2);
        }
    };

    init_tracing(cli.verbose, &config.log);
    tracing::debug!(?config, "meterbook CLI starting");

    let mut stdout = std::io::stdout().lock();
    let result = match &cli.command {
        Commands::Validate(args) => run_validate(args, &config, &mut stdout),
        Commands::CheckPattern(args) => run_check_pattern(args, &mut stdout),
        Commands::Presets(args) => run_presets(args, &config, &mut stdout),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(2)
        }
    }
}

/// Filter precedence: `log.filter` from config, then `RUST_LOG`, then the
/// `-v` count.
fn build_filter(verbose: u8, log: &LogConfig) -> EnvFilter {
    if let Some(directive) = log.filter.as_deref() {
        if let Ok(filter) = EnvFilter::try_new(directive) {
            return filter;
        }
    }
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    }
}

fn init_tracing(verbose: u8, log: &LogConfig) {
    let filter = build_filter(verbose, log);
    if log.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
}
