//! # Status Subcommands
//!
//! Read-only views of the shipment state machine: allowed targets from a
//! given position, a single transition check, and the status catalogue.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use freight_core::{PaymentCollectionStatus, TransportMode};
use freight_state::{allowed_targets, validate_transition, CustomerStatus, ShipmentStatus};

use crate::{print_json, EXIT_REJECTED};

/// Where a shipment currently stands.
#[derive(Args, Debug)]
pub struct PositionArgs {
    /// Assigned transport mode (AIR or SEA). Omit before verification.
    #[arg(long)]
    pub mode: Option<TransportMode>,

    /// Current status. Omit for a shipment with no status yet.
    #[arg(long)]
    pub current: Option<ShipmentStatus>,

    /// Ladder status held before the current exception.
    #[arg(long)]
    pub resume_from: Option<ShipmentStatus>,

    /// Payment collection status.
    #[arg(long, default_value = "UNPAID")]
    pub payment: PaymentCollectionStatus,
}

/// Arguments for the `freight transitions` subcommand.
#[derive(Args, Debug)]
pub struct TransitionsArgs {
    #[command(flatten)]
    pub position: PositionArgs,

    /// Emit JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `freight check` subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub position: PositionArgs,

    /// Requested status.
    #[arg(long)]
    pub target: ShipmentStatus,
}

/// Arguments for the `freight statuses` subcommand.
#[derive(Args, Debug)]
pub struct StatusesArgs {
    /// Only statuses valid for this mode (common flow and exceptions included).
    #[arg(long)]
    pub mode: Option<TransportMode>,

    /// Emit JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

/// Execute the transitions subcommand.
pub fn run_transitions(args: &TransitionsArgs) -> Result<u8> {
    let p = &args.position;
    let targets = allowed_targets(p.mode, p.current, p.resume_from, p.payment);
    if args.json {
        print_json(&targets)?;
    } else {
        for target in &targets {
            println!("{target}");
        }
    }
    Ok(0)
}

/// Execute the check subcommand.
pub fn run_check(args: &CheckArgs) -> Result<u8> {
    let p = &args.position;
    match validate_transition(p.mode, p.current, p.resume_from, args.target, p.payment) {
        Ok(()) => {
            println!("allowed: {} -> {}", current_name(p.current), args.target);
            Ok(0)
        }
        Err(e) => {
            println!("rejected: {e}");
            Ok(EXIT_REJECTED)
        }
    }
}

fn current_name(current: Option<ShipmentStatus>) -> &'static str {
    current.map_or("(none)", |s| s.as_str())
}

/// One catalogue line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusEntry {
    pub status: ShipmentStatus,
    pub label: &'static str,
    pub milestone: bool,
    pub exception: bool,
    pub mode: Option<TransportMode>,
    pub customer_status: CustomerStatus,
}

/// The status catalogue, optionally narrowed to one mode.
pub fn catalogue(mode: Option<TransportMode>) -> Vec<StatusEntry> {
    ShipmentStatus::all()
        .iter()
        .copied()
        .filter(|s| match (mode, s.exclusive_mode()) {
            (Some(wanted), Some(only)) => wanted == only,
            _ => true,
        })
        .map(|status| StatusEntry {
            status,
            label: status.label(),
            milestone: status.is_milestone(),
            exception: status.is_exception(),
            mode: status.exclusive_mode(),
            customer_status: CustomerStatus::project(Some(status)),
        })
        .collect()
}

/// Execute the statuses subcommand.
pub fn run_statuses(args: &StatusesArgs) -> Result<u8> {
    let entries = catalogue(args.mode);
    if args.json {
        print_json(&entries)?;
        return Ok(0);
    }
    for e in &entries {
        let flags = match (e.milestone, e.exception) {
            (true, _) => "milestone",
            (false, true) => "exception",
            _ => "",
        };
        let mode = e.mode.map_or("-", |m| m.as_str());
        println!(
            "{:<34} {:<4} {:<10} {:<24} {}",
            e.status.as_str(),
            mode,
            flags,
            e.customer_status.as_str(),
            e.label
        );
    }
    Ok(0)
}
