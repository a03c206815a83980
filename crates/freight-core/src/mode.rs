//! # Transport Mode and Payment Collection Status
//!
//! `TransportMode` fixes which sequential status ladder, which tariff, and
//! which billable quantity (weight or volume) apply to a shipment. It is
//! unset until warehouse verification and immutable afterwards.
//!
//! `PaymentCollectionStatus` is consumed as a gate only: the lifecycle never
//! mutates it.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// How a shipment travels between origin and destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransportMode {
    /// Air freight, billed per kilogram.
    Air,
    /// Sea freight, billed per cubic metre.
    Sea,
}

impl TransportMode {
    /// Canonical wire/storage name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Air => "AIR",
            Self::Sea => "SEA",
        }
    }

    /// The unit the billable quantity is expressed in.
    pub fn billing_unit(&self) -> &'static str {
        match self {
            Self::Air => "kg",
            Self::Sea => "cbm",
        }
    }

    /// All transport modes.
    pub fn all() -> &'static [TransportMode] {
        &[Self::Air, Self::Sea]
    }
}

impl std::fmt::Display for TransportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransportMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AIR" => Ok(Self::Air),
            "SEA" => Ok(Self::Sea),
            _ => Err(ValidationError::UnknownTransportMode(s.to_string())),
        }
    }
}

/// Collection state of the shipment's charge, owned by the payments collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentCollectionStatus {
    /// Nothing collected yet.
    #[default]
    Unpaid,
    /// Partial payment or a payment being processed.
    PaymentInProgress,
    /// The final charge has been collected in full.
    PaidInFull,
}

impl PaymentCollectionStatus {
    /// Canonical wire/storage name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unpaid => "UNPAID",
            Self::PaymentInProgress => "PAYMENT_IN_PROGRESS",
            Self::PaidInFull => "PAID_IN_FULL",
        }
    }

    /// Whether terminal handover states may be entered.
    pub fn is_paid_in_full(&self) -> bool {
        matches!(self, Self::PaidInFull)
    }
}

impl std::fmt::Display for PaymentCollectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentCollectionStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "UNPAID" => Ok(Self::Unpaid),
            "PAYMENT_IN_PROGRESS" => Ok(Self::PaymentInProgress),
            "PAID_IN_FULL" => Ok(Self::PaidInFull),
            _ => Err(ValidationError::UnknownPaymentStatus(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_parse_is_case_insensitive() {
        assert_eq!("air".parse::<TransportMode>().unwrap(), TransportMode::Air);
        assert_eq!(" SEA ".parse::<TransportMode>().unwrap(), TransportMode::Sea);
        assert!("rail".parse::<TransportMode>().is_err());
    }

    #[test]
    fn mode_serde_uses_screaming_case() {
        let json = serde_json::to_string(&TransportMode::Air).unwrap();
        assert_eq!(json, "\"AIR\"");
        let parsed: TransportMode = serde_json::from_str("\"SEA\"").unwrap();
        assert_eq!(parsed, TransportMode::Sea);
    }

    #[test]
    fn billing_units() {
        assert_eq!(TransportMode::Air.billing_unit(), "kg");
        assert_eq!(TransportMode::Sea.billing_unit(), "cbm");
    }

    #[test]
    fn payment_status_roundtrips_through_str() {
        for status in [
            PaymentCollectionStatus::Unpaid,
            PaymentCollectionStatus::PaymentInProgress,
            PaymentCollectionStatus::PaidInFull,
        ] {
            assert_eq!(status.as_str().parse::<PaymentCollectionStatus>().unwrap(), status);
        }
    }

    #[test]
    fn only_paid_in_full_opens_gate() {
        assert!(PaymentCollectionStatus::PaidInFull.is_paid_in_full());
        assert!(!PaymentCollectionStatus::PaymentInProgress.is_paid_in_full());
        assert!(!PaymentCollectionStatus::Unpaid.is_paid_in_full());
        assert_eq!(PaymentCollectionStatus::default(), PaymentCollectionStatus::Unpaid);
    }
}
