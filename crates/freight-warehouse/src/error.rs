//! Normalization errors. All of them are caller input problems.

use rust_decimal::Decimal;
use thiserror::Error;

use freight_core::TransportMode;

/// Why a warehouse package list was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PackageError {
    #[error("at least one package is required")]
    EmptyPackageList,

    #[error("transport mode is required: none was supplied and none is recorded on the shipment")]
    ModeUnresolved,

    #[error("transport mode is already {recorded} and cannot change to {requested}")]
    ModeConflict {
        recorded: TransportMode,
        requested: TransportMode,
    },

    #[error("package {index}: quantity must be a positive integer, got {quantity}")]
    InvalidQuantity { index: usize, quantity: i64 },

    #[error("package {index}: {field} must not be negative, got {value}")]
    NegativeMeasurement {
        index: usize,
        field: &'static str,
        value: Decimal,
    },

    #[error("package {index}: {field} must be positive, got {value}")]
    NonPositiveDimension {
        index: usize,
        field: &'static str,
        value: Decimal,
    },

    /// Override approval and reason must be supplied together.
    #[error(
        "package {index}: a restricted-item override needs both approval and a non-blank reason"
    )]
    InconsistentRestrictedOverride { index: usize },

    /// A measurement, or a running total of one, does not fit in a `Decimal`.
    #[error("package {index}: {field} is out of range")]
    MeasurementOutOfRange { index: usize, field: &'static str },

    #[error("air shipment has no billable weight (package total {total_weight_kg} kg, no previous weight)")]
    NoBillableWeight { total_weight_kg: Decimal },

    #[error("sea shipment has no billable volume (package total {total_cbm} cbm)")]
    NoBillableVolume { total_cbm: Decimal },
}
