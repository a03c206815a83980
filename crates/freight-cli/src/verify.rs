//! # Verify Subcommand
//!
//! Dry-run warehouse verification. A throwaway shipment is created in an
//! in-memory store and verified through the real orchestrator, so the
//! output is exactly what the service would record. Nothing is persisted.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use rust_decimal::Decimal;
use uuid::Uuid;

use freight_core::{ActorId, CustomerId, TransportMode};
use freight_lifecycle::memory::{MemoryShipmentStore, StaticRateTables, TracingNotifier};
use freight_lifecycle::{
    Lifecycle, LifecycleError, Shipment, ShipmentStore, VerificationInput, VerifiedShipment,
};
use freight_pricing::RateTable;

use crate::config::{load_rate_table, CliConfig};
use crate::{print_json, runtime, EXIT_REJECTED};

/// Arguments for the `freight verify` subcommand.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Verification request file (YAML or JSON) with `packages` and
    /// optional `transport_mode`, `manual_charge_usd`, `price_adjustment_reason`.
    #[arg(long)]
    pub input: PathBuf,

    /// Override the request's transport mode.
    #[arg(long)]
    pub mode: Option<TransportMode>,

    /// Sender UUID for override lookup. Defaults to FREIGHT_DEFAULT_CUSTOMER.
    #[arg(long)]
    pub customer: Option<Uuid>,

    /// Rate-table file (YAML or JSON). Defaults to FREIGHT_RATE_TABLE.
    #[arg(long)]
    pub rate_table: Option<PathBuf>,

    /// Weight previously recorded on the shipment, used when packages
    /// carry none.
    #[arg(long)]
    pub previous_weight: Option<Decimal>,

    /// Emit JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

/// Read a verification request, choosing the format from the extension.
pub fn load_input(path: &Path) -> Result<VerificationInput> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    let input = if is_json {
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?
    } else {
        serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?
    };
    Ok(input)
}

/// Verify `input` against a fresh in-memory shipment.
pub async fn dry_run(
    input: VerificationInput,
    sender: CustomerId,
    previous_weight: Option<Decimal>,
    table: RateTable,
) -> Result<Result<VerifiedShipment, LifecycleError>> {
    let store = MemoryShipmentStore::new();
    let mut shipment = Shipment::new("DRY-RUN", sender);
    shipment.weight_kg = previous_weight;
    store
        .create(&shipment)
        .await
        .context("failed to stage dry-run shipment")?;

    let lifecycle = Lifecycle::new(
        Arc::new(store),
        Arc::new(StaticRateTables::new(table)),
        Arc::new(TracingNotifier),
    );
    let actor = ActorId::new("freight-cli");
    Ok(lifecycle
        .verify_order_at_warehouse(shipment.id, input, &actor)
        .await)
}

/// Execute the verify subcommand.
pub fn run_verify(args: &VerifyArgs, config: &CliConfig) -> Result<u8> {
    let mut input = load_input(&args.input)?;
    if args.mode.is_some() {
        input.transport_mode = args.mode;
    }
    let table = match config.rate_table_path(args.rate_table.as_deref()) {
        Some(path) => load_rate_table(path)?,
        None => RateTable::default(),
    };
    let sender = config.customer(args.customer).unwrap_or_else(CustomerId::new);

    let outcome = runtime()?.block_on(dry_run(input, sender, args.previous_weight, table))?;
    match outcome {
        Ok(verified) => {
            if args.json {
                print_json(&verified)?;
            } else {
                print!("{}", render(&verified));
            }
            Ok(0)
        }
        Err(e) => {
            eprintln!("error[{}]: {e}", e.kind().code());
            Ok(EXIT_REJECTED)
        }
    }
}

fn render(v: &VerifiedShipment) -> String {
    let s = &v.shipment;
    let mut out = String::new();
    let opt = |d: Option<Decimal>| d.map_or_else(|| "-".to_string(), |d| d.to_string());
    out.push_str(&format!(
        "mode:       {}\n",
        s.transport_mode.map_or("-", |m| m.as_str())
    ));
    out.push_str(&format!("packages:   {}\n", v.packages.len()));
    out.push_str(&format!("weight_kg:  {}\n", opt(s.weight_kg)));
    out.push_str(&format!("cbm:        {}\n", opt(s.cbm)));
    out.push_str(&format!(
        "billable:   {} {}\n",
        v.quote.quantity,
        v.quote.mode.billing_unit()
    ));
    out.push_str(&format!("calculated: {} USD\n", opt(s.calculated_charge_usd)));
    out.push_str(&format!("final:      {} USD\n", opt(s.final_charge_usd)));
    if let Some(source) = s.pricing_source {
        out.push_str(&format!("source:     {source}\n"));
    }
    if let Some(reason) = &s.price_adjustment_reason {
        out.push_str(&format!("reason:     {reason}\n"));
    }
    out
}
