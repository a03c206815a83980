//! # Customer-Facing Status
//!
//! A coarser view of the lifecycle shown to customers. It is a pure
//! function of the authoritative [`ShipmentStatus`]; storage layers that
//! keep a mirror column write it from [`CustomerStatus::project`] in the
//! same statement as the status itself.

use serde::{Deserialize, Serialize};

use crate::status::ShipmentStatus;

/// What the customer sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CustomerStatus {
    OrderPlaced,
    AwaitingDropOff,
    AtWarehouse,
    Priced,
    PreparingForDeparture,
    InTransit,
    ArrivedAtDestination,
    OnTheWayToOffice,
    ReadyForPickup,
    Completed,
    OnHold,
    Cancelled,
    ActionRequired,
}

impl CustomerStatus {
    /// Project an authoritative status (or its absence) to the customer view.
    pub fn project(status: Option<ShipmentStatus>) -> Self {
        use ShipmentStatus as S;
        match status {
            None | Some(S::Submitted) => Self::OrderPlaced,
            Some(S::AwaitingWarehouseReceipt) => Self::AwaitingDropOff,
            Some(S::ReceivedAtWarehouse) | Some(S::RestrictedItemOverrideApproved) => {
                Self::AtWarehouse
            }
            Some(S::WarehouseVerifiedPriced) => Self::Priced,
            Some(
                S::DispatchedToOriginAirport
                | S::AtOriginAirport
                | S::BoardedOnFlight
                | S::DispatchedToOriginPort
                | S::AtOriginPort
                | S::LoadedOnVessel,
            ) => Self::PreparingForDeparture,
            Some(S::FlightDeparted | S::VesselDeparted) => Self::InTransit,
            Some(S::FlightLanded | S::VesselArrived | S::CustomsCleared) => {
                Self::ArrivedAtDestination
            }
            Some(S::InTransitToDestinationOffice) => Self::OnTheWayToOffice,
            Some(S::ReadyForPickup) => Self::ReadyForPickup,
            Some(S::PickedUpCompleted) => Self::Completed,
            Some(S::OnHold) => Self::OnHold,
            Some(S::Cancelled) => Self::Cancelled,
            Some(S::RestrictedItemRejected) => Self::ActionRequired,
        }
    }

    /// Canonical wire/storage name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OrderPlaced => "ORDER_PLACED",
            Self::AwaitingDropOff => "AWAITING_DROP_OFF",
            Self::AtWarehouse => "AT_WAREHOUSE",
            Self::Priced => "PRICED",
            Self::PreparingForDeparture => "PREPARING_FOR_DEPARTURE",
            Self::InTransit => "IN_TRANSIT",
            Self::ArrivedAtDestination => "ARRIVED_AT_DESTINATION",
            Self::OnTheWayToOffice => "ON_THE_WAY_TO_OFFICE",
            Self::ReadyForPickup => "READY_FOR_PICKUP",
            Self::Completed => "COMPLETED",
            Self::OnHold => "ON_HOLD",
            Self::Cancelled => "CANCELLED",
            Self::ActionRequired => "ACTION_REQUIRED",
        }
    }
}

impl std::fmt::Display for CustomerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
