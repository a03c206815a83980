//! # Built-In Fallback Tariff
//!
//! Used when neither the customer's overrides nor the default rules yield a
//! match, or when a rate table could not be read. It needs no
//! configuration and never fails for a positive quantity.
//!
//! | Air weight (kg)  | USD/kg |
//! |------------------|--------|
//! | (0, 100]         | 13.5   |
//! | (100, 300]       | 11.5   |
//! | (300, 600]       | 10.8   |
//! | (600, 1000]      | 10.5   |
//! | (1000, 1500]     | 10.0   |
//! | above 1500       | 9.8    |
//!
//! Sea is a flat 550 USD/cbm.

use rust_decimal::Decimal;

use freight_core::TransportMode;

/// Air tiers as (inclusive upper bound in kg, USD/kg). `None` is unbounded.
fn air_tiers() -> [(Option<Decimal>, Decimal); 6] {
    [
        (Some(Decimal::new(100, 0)), Decimal::new(135, 1)),
        (Some(Decimal::new(300, 0)), Decimal::new(115, 1)),
        (Some(Decimal::new(600, 0)), Decimal::new(108, 1)),
        (Some(Decimal::new(1000, 0)), Decimal::new(105, 1)),
        (Some(Decimal::new(1500, 0)), Decimal::new(100, 1)),
        (None, Decimal::new(98, 1)),
    ]
}

/// Flat sea rate in USD/cbm.
pub fn sea_rate() -> Decimal {
    Decimal::new(550, 0)
}

/// Tariff unit rate for a billable quantity.
///
/// The caller is responsible for rejecting non-positive quantities; for
/// those this returns the first air tier.
pub fn fallback_rate(mode: TransportMode, quantity: Decimal) -> Decimal {
    match mode {
        TransportMode::Sea => sea_rate(),
        TransportMode::Air => {
            let tiers = air_tiers();
            tiers
                .iter()
                .find(|(upper, _)| upper.map_or(true, |upper| quantity <= upper))
                .map_or(tiers[tiers.len() - 1].1, |(_, rate)| *rate)
        }
    }
}
