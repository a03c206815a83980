//! # Quote Subcommand
//!
//! Resolves a rate the same way warehouse verification does: customer
//! override, then default rule, then the built-in tariff. Without a rate
//! table only the tariff applies.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use rust_decimal::Decimal;
use uuid::Uuid;

use freight_core::{Timestamp, TransportMode};
use freight_pricing::{quote, PricingQuote, RateQuery, RateTable};

use crate::config::{load_rate_table, CliConfig};
use crate::{print_json, EXIT_REJECTED};

/// Arguments for the `freight quote` subcommand.
#[derive(Args, Debug)]
pub struct QuoteArgs {
    /// Transport mode (AIR or SEA).
    #[arg(long)]
    pub mode: TransportMode,

    /// Billable quantity: kilograms for AIR, cubic metres for SEA.
    #[arg(long)]
    pub quantity: Decimal,

    /// Customer UUID for override lookup. Defaults to FREIGHT_DEFAULT_CUSTOMER.
    #[arg(long)]
    pub customer: Option<Uuid>,

    /// Rate-table file (YAML or JSON). Defaults to FREIGHT_RATE_TABLE.
    #[arg(long)]
    pub rate_table: Option<PathBuf>,

    /// Pricing instant (RFC 3339). Defaults to now.
    #[arg(long)]
    pub as_of: Option<String>,

    /// Emit JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

/// Execute the quote subcommand.
pub fn run_quote(args: &QuoteArgs, config: &CliConfig) -> Result<u8> {
    let table = match config.rate_table_path(args.rate_table.as_deref()) {
        Some(path) => load_rate_table(path)?,
        None => {
            tracing::info!("no rate table configured, quoting from the built-in tariff");
            RateTable::default()
        }
    };
    let as_of = match &args.as_of {
        Some(raw) => Timestamp::parse(raw).context("invalid --as-of")?,
        None => Timestamp::now(),
    };

    let query = RateQuery {
        customer_id: config.customer(args.customer),
        mode: args.mode,
        quantity: args.quantity,
        as_of,
    };
    let overrides = query
        .customer_id
        .map(|customer| table.overrides_for(customer, args.mode))
        .unwrap_or_default();
    let defaults = table.default_rules(args.mode);

    match quote(&query, Some(&overrides), Some(&defaults)) {
        Ok(priced) => {
            if args.json {
                print_json(&priced)?;
            } else {
                print!("{}", render(&priced));
            }
            Ok(0)
        }
        Err(e) => {
            eprintln!("quote refused: {e}");
            Ok(EXIT_REJECTED)
        }
    }
}

fn render(q: &PricingQuote) -> String {
    let unit = q.mode.billing_unit();
    let mut out = String::new();
    out.push_str(&format!("mode:     {}\n", q.mode));
    out.push_str(&format!("billable: {} {unit}\n", q.quantity));
    out.push_str(&format!("rate:     {} USD/{unit}\n", q.unit_rate));
    match &q.rule_name {
        Some(name) => out.push_str(&format!("source:   {} ({name})\n", q.pricing_source)),
        None => out.push_str(&format!("source:   {}\n", q.pricing_source)),
    }
    out.push_str(&format!("amount:   {} USD\n", q.amount_usd));
    out
}
