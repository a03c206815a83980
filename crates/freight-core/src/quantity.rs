//! # Precision Rules
//!
//! Aggregated weights are kept to grams (3 dp), volumes to cubic
//! centimetres (6 dp), and money to cents (2 dp). Midpoints round away from
//! zero, so 0.125 USD becomes 0.13 rather than the banker's 0.12.

use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places kept for weights in kilograms.
pub const WEIGHT_SCALE: u32 = 3;

/// Decimal places kept for volumes in cubic metres.
pub const CBM_SCALE: u32 = 6;

/// Decimal places kept for USD amounts.
pub const MONEY_SCALE: u32 = 2;

/// Round a kilogram weight to 3 decimal places.
pub fn round_weight(kg: Decimal) -> Decimal {
    kg.round_dp_with_strategy(WEIGHT_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Round a cubic-metre volume to 6 decimal places.
pub fn round_cbm(cbm: Decimal) -> Decimal {
    cbm.round_dp_with_strategy(CBM_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Round a USD amount to cents.
pub fn round_money(usd: Decimal) -> Decimal {
    usd.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}
