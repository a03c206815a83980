//! Rate-table reads.
//!
//! Rows are returned unfiltered apart from mode and customer; activity and
//! validity windows are judged by the resolver at the pricing instant.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use freight_core::{CustomerId, Timestamp, TransportMode};
use freight_lifecycle::{RateTableSource, StoreError};
use freight_pricing::{CustomerPricingOverride, PricingRule, RateTier, ValidityWindow};

use crate::{decode, store_error};

/// [`RateTableSource`] backed by the `pricing_rules` and
/// `customer_pricing_overrides` tables.
#[derive(Debug, Clone)]
pub struct PgRateTableSource {
    pool: PgPool,
}

impl PgRateTableSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RateTableSource for PgRateTableSource {
    async fn default_rules(&self, mode: TransportMode) -> Result<Vec<PricingRule>, StoreError> {
        let rows = sqlx::query_as::<_, PricingRuleRow>(
            "SELECT id, name, mode, min_weight_kg, max_weight_kg, rate_usd, is_active,
             valid_from, valid_until, updated_at
             FROM pricing_rules WHERE mode = $1",
        )
        .bind(mode.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        rows.into_iter().map(PricingRuleRow::into_record).collect()
    }

    async fn customer_overrides(
        &self,
        customer: CustomerId,
        mode: TransportMode,
    ) -> Result<Vec<CustomerPricingOverride>, StoreError> {
        let rows = sqlx::query_as::<_, OverrideRow>(
            "SELECT id, customer_id, name, mode, min_weight_kg, max_weight_kg, rate_usd,
             is_active, starts_at, ends_at, updated_at
             FROM customer_pricing_overrides WHERE customer_id = $1 AND mode = $2",
        )
        .bind(customer.0)
        .bind(mode.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        rows.into_iter().map(OverrideRow::into_record).collect()
    }
}

fn tier(
    mode: &str,
    min_weight_kg: Option<Decimal>,
    max_weight_kg: Option<Decimal>,
    rate_usd: Decimal,
) -> Result<RateTier, StoreError> {
    Ok(match decode::<TransportMode, _>("mode", mode)? {
        TransportMode::Air => RateTier::PerKg {
            min_weight_kg: min_weight_kg.unwrap_or(Decimal::ZERO),
            max_weight_kg,
            rate_usd_per_kg: rate_usd,
        },
        TransportMode::Sea => RateTier::PerCbm {
            rate_usd_per_cbm: rate_usd,
        },
    })
}

fn window(from: Option<DateTime<Utc>>, until: Option<DateTime<Utc>>) -> ValidityWindow {
    ValidityWindow {
        valid_from: from.map(Timestamp::from_utc),
        valid_until: until.map(Timestamp::from_utc),
    }
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct PricingRuleRow {
    id: Uuid,
    name: String,
    mode: String,
    min_weight_kg: Option<Decimal>,
    max_weight_kg: Option<Decimal>,
    rate_usd: Decimal,
    is_active: bool,
    valid_from: Option<DateTime<Utc>>,
    valid_until: Option<DateTime<Utc>>,
    updated_at: DateTime<Utc>,
}

impl PricingRuleRow {
    fn into_record(self) -> Result<PricingRule, StoreError> {
        Ok(PricingRule {
            id: self.id,
            tier: tier(&self.mode, self.min_weight_kg, self.max_weight_kg, self.rate_usd)?,
            name: self.name,
            is_active: self.is_active,
            window: window(self.valid_from, self.valid_until),
            updated_at: Timestamp::from_utc(self.updated_at),
        })
    }
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct OverrideRow {
    id: Uuid,
    customer_id: Uuid,
    name: String,
    mode: String,
    min_weight_kg: Option<Decimal>,
    max_weight_kg: Option<Decimal>,
    rate_usd: Decimal,
    is_active: bool,
    starts_at: Option<DateTime<Utc>>,
    ends_at: Option<DateTime<Utc>>,
    updated_at: DateTime<Utc>,
}

impl OverrideRow {
    fn into_record(self) -> Result<CustomerPricingOverride, StoreError> {
        Ok(CustomerPricingOverride {
            id: self.id,
            customer_id: CustomerId(self.customer_id),
            tier: tier(&self.mode, self.min_weight_kg, self.max_weight_kg, self.rate_usd)?,
            name: self.name,
            is_active: self.is_active,
            window: window(self.starts_at, self.ends_at),
            updated_at: Timestamp::from_utc(self.updated_at),
        })
    }
}
