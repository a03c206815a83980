//! # freight-cli — Operator Tooling
//!
//! Provides the `freight` command-line interface over the lifecycle core.
//!
//! ## Subcommands
//!
//! - `freight quote`: Price a billable quantity against a rate table.
//! - `freight transitions`: List the statuses a shipment may move to.
//! - `freight check`: Validate one status change and explain a refusal.
//! - `freight statuses`: Print the status catalogue.
//! - `freight verify`: Dry-run warehouse verification from a package file.
//! - `freight migrate`: Apply the database migrations.
//!
//! ```bash
//! freight quote --mode air --quantity 110.5
//! freight check --mode sea --current VESSEL_ARRIVED --target READY_FOR_PICKUP
//! freight check --mode air --current ON_HOLD --resume-from FLIGHT_LANDED --target CUSTOMS_CLEARED
//! freight verify --input packages.yaml --rate-table rates.yaml
//! ```

pub mod config;
pub mod migrate;
pub mod quote;
pub mod status;
pub mod verify;

use anyhow::Result;
use serde::Serialize;

/// Exit code for a well-formed request the domain refused.
pub const EXIT_REJECTED: u8 = 2;

/// Print `value` as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Build the single-threaded runtime the async subcommands run on.
pub fn runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}
