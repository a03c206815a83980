//! # Error Types
//!
//! Parsing and validation errors for the foundational types. Domain crates
//! define their own richer error enums and wrap these where needed.

use thiserror::Error;

/// Failure to parse or validate a foundational value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Unknown transport mode name.
    #[error("unknown transport mode: {0:?} (expected AIR or SEA)")]
    UnknownTransportMode(String),

    /// Unknown payment collection status name.
    #[error("unknown payment collection status: {0:?}")]
    UnknownPaymentStatus(String),

    /// Unknown shipment status name.
    #[error("unknown shipment status: {0:?}")]
    UnknownStatus(String),

    /// Malformed identifier.
    #[error("invalid {kind} identifier {value:?}: {reason}")]
    InvalidIdentifier {
        /// Identifier namespace (e.g. "shipment").
        kind: &'static str,
        /// The rejected input.
        value: String,
        /// Parser message.
        reason: String,
    },

    /// Malformed or non-UTC timestamp.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
}
