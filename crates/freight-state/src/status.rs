//! # Shipment Status
//!
//! The single authoritative lifecycle status of a shipment, with the
//! exhaustive label, customer message, and milestone tables.
//!
//! Every table is a `match` over all variants, so adding a status without a
//! label or message is a compile error rather than a silent runtime fallback.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use freight_core::{TransportMode, ValidationError};

/// Lifecycle status of a shipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShipmentStatus {
    // ─── Common flow ─────────────────────────────────────────────────
    /// Order captured, nothing received yet.
    Submitted,
    /// Customer told to drop goods at the origin warehouse.
    AwaitingWarehouseReceipt,
    /// Goods physically received at the origin warehouse.
    ReceivedAtWarehouse,
    /// Packages measured, mode fixed, charge computed.
    WarehouseVerifiedPriced,

    // ─── Air ladder ──────────────────────────────────────────────────
    /// Left the warehouse for the origin airport.
    DispatchedToOriginAirport,
    /// Handed to the airline at the origin airport.
    AtOriginAirport,
    /// Loaded onto the aircraft.
    BoardedOnFlight,
    /// Flight has departed.
    FlightDeparted,
    /// Flight has landed at destination.
    FlightLanded,

    // ─── Sea ladder ──────────────────────────────────────────────────
    /// Left the warehouse for the origin port.
    DispatchedToOriginPort,
    /// Delivered to the origin port terminal.
    AtOriginPort,
    /// Container loaded onto the vessel.
    LoadedOnVessel,
    /// Vessel has sailed.
    VesselDeparted,
    /// Vessel has berthed at destination.
    VesselArrived,

    // ─── Common tail ─────────────────────────────────────────────────
    /// Released by destination customs.
    CustomsCleared,
    /// Moving from the port of entry to the destination office.
    InTransitToDestinationOffice,
    /// Waiting for the recipient at the destination office.
    ReadyForPickup,
    /// Collected by the recipient.
    PickedUpCompleted,

    // ─── Exceptions ──────────────────────────────────────────────────
    /// Paused by an operator.
    OnHold,
    /// Cancelled; no further ladder movement.
    Cancelled,
    /// Contains a restricted item that was refused.
    RestrictedItemRejected,
    /// Contains a restricted item that an operator cleared.
    RestrictedItemOverrideApproved,
}

impl ShipmentStatus {
    /// Every status, in ladder order followed by the exceptions.
    pub fn all() -> &'static [ShipmentStatus] {
        &[
            Self::Submitted,
            Self::AwaitingWarehouseReceipt,
            Self::ReceivedAtWarehouse,
            Self::WarehouseVerifiedPriced,
            Self::DispatchedToOriginAirport,
            Self::AtOriginAirport,
            Self::BoardedOnFlight,
            Self::FlightDeparted,
            Self::FlightLanded,
            Self::DispatchedToOriginPort,
            Self::AtOriginPort,
            Self::LoadedOnVessel,
            Self::VesselDeparted,
            Self::VesselArrived,
            Self::CustomsCleared,
            Self::InTransitToDestinationOffice,
            Self::ReadyForPickup,
            Self::PickedUpCompleted,
            Self::OnHold,
            Self::Cancelled,
            Self::RestrictedItemRejected,
            Self::RestrictedItemOverrideApproved,
        ]
    }

    /// Canonical wire/storage name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submitted => "SUBMITTED",
            Self::AwaitingWarehouseReceipt => "AWAITING_WAREHOUSE_RECEIPT",
            Self::ReceivedAtWarehouse => "RECEIVED_AT_WAREHOUSE",
            Self::WarehouseVerifiedPriced => "WAREHOUSE_VERIFIED_PRICED",
            Self::DispatchedToOriginAirport => "DISPATCHED_TO_ORIGIN_AIRPORT",
            Self::AtOriginAirport => "AT_ORIGIN_AIRPORT",
            Self::BoardedOnFlight => "BOARDED_ON_FLIGHT",
            Self::FlightDeparted => "FLIGHT_DEPARTED",
            Self::FlightLanded => "FLIGHT_LANDED",
            Self::DispatchedToOriginPort => "DISPATCHED_TO_ORIGIN_PORT",
            Self::AtOriginPort => "AT_ORIGIN_PORT",
            Self::LoadedOnVessel => "LOADED_ON_VESSEL",
            Self::VesselDeparted => "VESSEL_DEPARTED",
            Self::VesselArrived => "VESSEL_ARRIVED",
            Self::CustomsCleared => "CUSTOMS_CLEARED",
            Self::InTransitToDestinationOffice => "IN_TRANSIT_TO_DESTINATION_OFFICE",
            Self::ReadyForPickup => "READY_FOR_PICKUP",
            Self::PickedUpCompleted => "PICKED_UP_COMPLETED",
            Self::OnHold => "ON_HOLD",
            Self::Cancelled => "CANCELLED",
            Self::RestrictedItemRejected => "RESTRICTED_ITEM_REJECTED",
            Self::RestrictedItemOverrideApproved => "RESTRICTED_ITEM_OVERRIDE_APPROVED",
        }
    }

    /// Short operator-facing label, also used in notifications.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Submitted => "Submitted",
            Self::AwaitingWarehouseReceipt => "Awaiting warehouse receipt",
            Self::ReceivedAtWarehouse => "Received at warehouse",
            Self::WarehouseVerifiedPriced => "Verified and priced",
            Self::DispatchedToOriginAirport => "Dispatched to origin airport",
            Self::AtOriginAirport => "At origin airport",
            Self::BoardedOnFlight => "Boarded on flight",
            Self::FlightDeparted => "Flight departed",
            Self::FlightLanded => "Flight landed",
            Self::DispatchedToOriginPort => "Dispatched to origin port",
            Self::AtOriginPort => "At origin port",
            Self::LoadedOnVessel => "Loaded on vessel",
            Self::VesselDeparted => "Vessel departed",
            Self::VesselArrived => "Vessel arrived",
            Self::CustomsCleared => "Customs cleared",
            Self::InTransitToDestinationOffice => "In transit to destination office",
            Self::ReadyForPickup => "Ready for pickup",
            Self::PickedUpCompleted => "Picked up",
            Self::OnHold => "On hold",
            Self::Cancelled => "Cancelled",
            Self::RestrictedItemRejected => "Restricted item rejected",
            Self::RestrictedItemOverrideApproved => "Restricted item approved",
        }
    }

    /// Sentence shown to the customer for this status.
    pub fn customer_message(&self) -> &'static str {
        match self {
            Self::Submitted => "We have received your shipment request.",
            Self::AwaitingWarehouseReceipt => {
                "Please drop your goods at our origin warehouse."
            }
            Self::ReceivedAtWarehouse => "Your goods have arrived at our warehouse.",
            Self::WarehouseVerifiedPriced => {
                "Your packages have been measured and your shipment has been priced."
            }
            Self::DispatchedToOriginAirport => "Your shipment is on its way to the airport.",
            Self::AtOriginAirport => "Your shipment has been handed to the airline.",
            Self::BoardedOnFlight => "Your shipment has been loaded onto the aircraft.",
            Self::FlightDeparted => "Your shipment is in the air.",
            Self::FlightLanded => "Your shipment has landed at the destination.",
            Self::DispatchedToOriginPort => "Your shipment is on its way to the port.",
            Self::AtOriginPort => "Your shipment has arrived at the port terminal.",
            Self::LoadedOnVessel => "Your shipment has been loaded onto the vessel.",
            Self::VesselDeparted => "Your shipment is at sea.",
            Self::VesselArrived => "Your shipment has arrived at the destination port.",
            Self::CustomsCleared => "Your shipment has cleared customs.",
            Self::InTransitToDestinationOffice => {
                "Your shipment is on its way to our destination office."
            }
            Self::ReadyForPickup => "Your shipment is ready for pickup.",
            Self::PickedUpCompleted => "Your shipment has been collected. Thank you!",
            Self::OnHold => "Your shipment is on hold. Our team will contact you.",
            Self::Cancelled => "Your shipment has been cancelled.",
            Self::RestrictedItemRejected => {
                "Your shipment contains an item we cannot carry. Our team will contact you."
            }
            Self::RestrictedItemOverrideApproved => {
                "A restricted item in your shipment has been approved for carriage."
            }
        }
    }

    /// Whether entering this status notifies the customer.
    pub fn is_milestone(&self) -> bool {
        match self {
            Self::ReceivedAtWarehouse
            | Self::WarehouseVerifiedPriced
            | Self::FlightDeparted
            | Self::FlightLanded
            | Self::VesselDeparted
            | Self::VesselArrived
            | Self::CustomsCleared
            | Self::ReadyForPickup
            | Self::PickedUpCompleted
            | Self::OnHold
            | Self::Cancelled
            | Self::RestrictedItemRejected => true,
            Self::Submitted
            | Self::AwaitingWarehouseReceipt
            | Self::DispatchedToOriginAirport
            | Self::AtOriginAirport
            | Self::BoardedOnFlight
            | Self::DispatchedToOriginPort
            | Self::AtOriginPort
            | Self::LoadedOnVessel
            | Self::InTransitToDestinationOffice
            | Self::RestrictedItemOverrideApproved => false,
        }
    }

    /// Exception statuses bypass sequencing and are reachable from anywhere.
    pub fn is_exception(&self) -> bool {
        matches!(
            self,
            Self::OnHold
                | Self::Cancelled
                | Self::RestrictedItemRejected
                | Self::RestrictedItemOverrideApproved
        )
    }

    /// Statuses reachable before a transport mode is known.
    pub fn is_common_flow(&self) -> bool {
        matches!(
            self,
            Self::Submitted
                | Self::AwaitingWarehouseReceipt
                | Self::ReceivedAtWarehouse
                | Self::WarehouseVerifiedPriced
        )
    }

    /// Exceptions that freeze the ladder: no resume is possible.
    pub fn is_terminal_exception(&self) -> bool {
        matches!(self, Self::Cancelled | Self::RestrictedItemRejected)
    }

    /// The transport mode a status belongs to, for mode-specific statuses.
    pub fn exclusive_mode(&self) -> Option<TransportMode> {
        match self {
            Self::DispatchedToOriginAirport
            | Self::AtOriginAirport
            | Self::BoardedOnFlight
            | Self::FlightDeparted
            | Self::FlightLanded => Some(TransportMode::Air),
            Self::DispatchedToOriginPort
            | Self::AtOriginPort
            | Self::LoadedOnVessel
            | Self::VesselDeparted
            | Self::VesselArrived => Some(TransportMode::Sea),
            _ => None,
        }
    }
}

impl std::fmt::Display for ShipmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShipmentStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        Self::all()
            .iter()
            .copied()
            .find(|status| status.as_str() == wanted)
            .ok_or_else(|| ValidationError::UnknownStatus(s.to_string()))
    }
}
