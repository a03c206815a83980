//! # Database Persistence Layer
//!
//! PostgreSQL implementations of the lifecycle collaborator traits via SQLx.
//!
//! ## Architecture
//!
//! The database layer is **optional**. When `DATABASE_URL` is set,
//! [`init_pool`] connects and applies the embedded migrations; callers then
//! wrap the pool in [`PgShipmentStore`] and [`PgRateTableSource`]. When it
//! is absent, callers fall back to the in-memory collaborators from
//! `freight-lifecycle`.
//!
//! Each lifecycle commit runs in exactly one transaction. Status changes
//! are compare-and-swap updates on the status the caller read.

pub mod rates;
pub mod shipments;

pub use rates::PgRateTableSource;
pub use shipments::PgShipmentStore;

use freight_lifecycle::StoreError;
use sqlx::postgres::{PgPool, PgPoolOptions};

/// Initialize the database connection pool and run migrations.
///
/// Returns `None` if `DATABASE_URL` is not set (in-memory-only mode).
/// Returns `Err` if the URL is set but the connection or migration fails.
pub async fn init_pool() -> Result<Option<PgPool>, sqlx::Error> {
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            tracing::warn!("DATABASE_URL not set, running with in-memory storage only");
            return Ok(None);
        }
    };

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect(&url)
        .await?;

    tracing::info!("connected to PostgreSQL");

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("database migrations applied");

    Ok(Some(pool))
}

/// Map a driver error onto the store's error type.
pub(crate) fn store_error(e: sqlx::Error) -> StoreError {
    tracing::error!(error = %e, "database operation failed");
    match &e {
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) | sqlx::Error::ColumnNotFound(_) => {
            StoreError::Corrupt(e.to_string())
        }
        _ => StoreError::Unavailable(e.to_string()),
    }
}

/// Decode a stored enum name, reporting unknown values as corruption.
pub(crate) fn decode<T, E>(column: &str, raw: &str) -> Result<T, StoreError>
where
    T: std::str::FromStr<Err = E>,
    E: std::fmt::Display,
{
    raw.parse::<T>().map_err(|e| {
        tracing::warn!(column, value = raw, error = %e, "undecodable value in database");
        StoreError::Corrupt(format!("{column}: {e}"))
    })
}
