//! # Pricing Calculator
//!
//! `amount_usd = round(quantity × unit_rate, 2)`, half away from zero. A
//! product that overflows is rejected with [`PricingError::AmountOutOfRange`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use freight_core::{round_money, TransportMode};

use crate::error::PricingError;
use crate::resolver::{require_positive, resolve_rate, RateQuery, ResolvedRate};
use crate::rule::{CustomerPricingOverride, PricingRule};
use crate::source::PricingSource;
use crate::tariff::fallback_rate;

/// A priced charge with its provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingQuote {
    pub amount_usd: Decimal,
    pub mode: TransportMode,
    pub quantity: Decimal,
    pub unit_rate: Decimal,
    pub pricing_source: PricingSource,
    pub rule_name: Option<String>,
}

fn amount(quantity: Decimal, unit_rate: Decimal) -> Result<Decimal, PricingError> {
    quantity
        .checked_mul(unit_rate)
        .map(round_money)
        .ok_or(PricingError::AmountOutOfRange {
            quantity,
            unit_rate,
        })
}

/// Price `quantity` at an already resolved rate.
pub fn calculate_pricing(
    mode: TransportMode,
    quantity: Decimal,
    rate: &ResolvedRate,
) -> Result<PricingQuote, PricingError> {
    require_positive(mode, quantity)?;
    Ok(PricingQuote {
        amount_usd: amount(quantity, rate.unit_rate)?,
        mode,
        quantity,
        unit_rate: rate.unit_rate,
        pricing_source: rate.pricing_source,
        rule_name: rate.rule_name.clone(),
    })
}

/// Price `quantity` against the built-in tariff alone.
///
/// ```
/// use freight_core::TransportMode;
/// use freight_pricing::calculate_default_pricing;
/// use rust_decimal::Decimal;
///
/// let quote = calculate_default_pricing(TransportMode::Air, Decimal::new(1105, 1)).unwrap();
/// assert_eq!(quote.amount_usd, Decimal::new(127075, 2));
/// ```
pub fn calculate_default_pricing(
    mode: TransportMode,
    quantity: Decimal,
) -> Result<PricingQuote, PricingError> {
    require_positive(mode, quantity)?;
    let unit_rate = fallback_rate(mode, quantity);
    Ok(PricingQuote {
        amount_usd: amount(quantity, unit_rate)?,
        mode,
        quantity,
        unit_rate,
        pricing_source: PricingSource::FallbackTariff,
        rule_name: None,
    })
}

/// Resolve and price in one step.
pub fn quote(
    query: &RateQuery,
    overrides: Option<&[CustomerPricingOverride]>,
    defaults: Option<&[PricingRule]>,
) -> Result<PricingQuote, PricingError> {
    let rate = resolve_rate(query, overrides, defaults)?;
    calculate_pricing(query.mode, query.quantity, &rate)
}

/// An operator-entered charge replacing the computed one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualAdjustment {
    pub charge_usd: Decimal,
    pub reason: String,
}

impl ManualAdjustment {
    /// Pair a manual charge with its justification.
    ///
    /// Returns `Ok(None)` when neither is supplied. A charge without a
    /// non-blank reason, a reason without a charge, or a negative charge is
    /// rejected.
    pub fn from_parts(
        charge_usd: Option<Decimal>,
        reason: Option<&str>,
    ) -> Result<Option<Self>, PricingError> {
        let reason = reason.map(str::trim).filter(|r| !r.is_empty());
        match (charge_usd, reason) {
            (None, None) => Ok(None),
            (None, Some(_)) => Err(PricingError::ReasonWithoutCharge),
            (Some(_), None) => Err(PricingError::MissingAdjustmentReason),
            (Some(charge), Some(_)) if charge < Decimal::ZERO => {
                Err(PricingError::NegativeManualCharge(charge))
            }
            (Some(charge), Some(reason)) => Ok(Some(Self {
                charge_usd: round_money(charge),
                reason: reason.to_string(),
            })),
        }
    }
}
