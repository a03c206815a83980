//! # freight CLI entry point
//!
//! Parses command-line arguments, installs the tracing subscriber, and
//! dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use freight_cli::config::CliConfig;
use freight_cli::migrate::{run_migrate, MigrateArgs};
use freight_cli::quote::{run_quote, QuoteArgs};
use freight_cli::status::{run_check, run_statuses, run_transitions, CheckArgs, StatusesArgs, TransitionsArgs};
use freight_cli::verify::{run_verify, VerifyArgs};

/// Freight lifecycle operator tooling.
///
/// Quotes rates, inspects the shipment state machine, and dry-runs
/// warehouse verification against a rate table.
#[derive(Parser, Debug)]
#[command(name = "freight", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Price a billable quantity.
    Quote(QuoteArgs),

    /// List the statuses a shipment may move to.
    Transitions(TransitionsArgs),

    /// Validate a single status change.
    Check(CheckArgs),

    /// Print the status catalogue.
    Statuses(StatusesArgs),

    /// Dry-run warehouse verification from a package file.
    Verify(VerifyArgs),

    /// Apply database migrations (requires DATABASE_URL).
    Migrate(MigrateArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG wins over -v.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });

    if cli.log_json {
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

    let config = match CliConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{e}");
            return ExitCode::from(1);
        }
    };
    tracing::debug!(?config, "resolved configuration");

    let result = match cli.command {
        Commands::Quote(args) => run_quote(&args, &config),
        Commands::Transitions(args) => run_transitions(&args),
        Commands::Check(args) => run_check(&args),
        Commands::Statuses(args) => run_statuses(&args),
        Commands::Verify(args) => run_verify(&args, &config),
        Commands::Migrate(args) => run_migrate(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
