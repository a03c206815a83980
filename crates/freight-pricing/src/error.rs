//! Pricing errors.

use rust_decimal::Decimal;
use thiserror::Error;

use freight_core::TransportMode;

/// Failures raised while pricing a shipment or loading rate tables.
#[derive(Error, Debug)]
pub enum PricingError {
    /// The billable quantity for the mode is zero or negative.
    #[error("{mode} pricing requires a positive {unit} quantity, got {quantity}")]
    NonPositiveQuantity {
        /// Shipment mode.
        mode: TransportMode,
        /// Billing unit (`kg` or `cbm`).
        unit: &'static str,
        /// The rejected quantity.
        quantity: Decimal,
    },

    /// `quantity × unit_rate` does not fit in a `Decimal`.
    #[error("charge for {quantity} at {unit_rate} per unit is out of range")]
    AmountOutOfRange {
        /// The billable quantity.
        quantity: Decimal,
        /// The resolved unit rate.
        unit_rate: Decimal,
    },

    /// A manual charge below zero.
    #[error("manual charge must not be negative, got {0}")]
    NegativeManualCharge(Decimal),

    /// A manual charge without a justification.
    #[error("manual charge requires a non-blank adjustment reason")]
    MissingAdjustmentReason,

    /// An adjustment reason without a manual charge.
    #[error("adjustment reason supplied without a manual charge")]
    ReasonWithoutCharge,

    /// A rate table document failed to parse.
    #[error("invalid rate table: {0}")]
    RateTable(String),
}

impl From<serde_yaml::Error> for PricingError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::RateTable(e.to_string())
    }
}

impl From<serde_json::Error> for PricingError {
    fn from(e: serde_json::Error) -> Self {
        Self::RateTable(e.to_string())
    }
}
