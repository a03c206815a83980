//! # Migrate Subcommand
//!
//! Connects with `DATABASE_URL` and applies the embedded schema migrations.

use anyhow::{bail, Context, Result};
use clap::Args;

use crate::runtime;

/// Arguments for the `freight migrate` subcommand.
#[derive(Args, Debug)]
pub struct MigrateArgs {}

/// Execute the migrate subcommand.
pub fn run_migrate(_args: &MigrateArgs) -> Result<u8> {
    let pool = runtime()?
        .block_on(freight_db::init_pool())
        .context("database initialization failed")?;
    if pool.is_none() {
        bail!("DATABASE_URL is not set");
    }
    println!("migrations applied");
    Ok(0)
}
