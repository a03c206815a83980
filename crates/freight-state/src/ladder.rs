//! # Sequential Ladders
//!
//! Ordered slices of sequenced statuses. A status's rank is its index in the
//! slice for the shipment's mode; exception statuses have no rank.

use freight_core::TransportMode;

use crate::status::ShipmentStatus;

/// Statuses reachable before a transport mode is known.
pub const COMMON_FLOW: [ShipmentStatus; 4] = [
    ShipmentStatus::Submitted,
    ShipmentStatus::AwaitingWarehouseReceipt,
    ShipmentStatus::ReceivedAtWarehouse,
    ShipmentStatus::WarehouseVerifiedPriced,
];

/// Full ladder for air shipments.
pub const AIR_LADDER: [ShipmentStatus; 13] = [
    ShipmentStatus::Submitted,
    ShipmentStatus::AwaitingWarehouseReceipt,
    ShipmentStatus::ReceivedAtWarehouse,
    ShipmentStatus::WarehouseVerifiedPriced,
    ShipmentStatus::DispatchedToOriginAirport,
    ShipmentStatus::AtOriginAirport,
    ShipmentStatus::BoardedOnFlight,
    ShipmentStatus::FlightDeparted,
    ShipmentStatus::FlightLanded,
    ShipmentStatus::CustomsCleared,
    ShipmentStatus::InTransitToDestinationOffice,
    ShipmentStatus::ReadyForPickup,
    ShipmentStatus::PickedUpCompleted,
];

/// Full ladder for sea shipments.
pub const SEA_LADDER: [ShipmentStatus; 13] = [
    ShipmentStatus::Submitted,
    ShipmentStatus::AwaitingWarehouseReceipt,
    ShipmentStatus::ReceivedAtWarehouse,
    ShipmentStatus::WarehouseVerifiedPriced,
    ShipmentStatus::DispatchedToOriginPort,
    ShipmentStatus::AtOriginPort,
    ShipmentStatus::LoadedOnVessel,
    ShipmentStatus::VesselDeparted,
    ShipmentStatus::VesselArrived,
    ShipmentStatus::CustomsCleared,
    ShipmentStatus::InTransitToDestinationOffice,
    ShipmentStatus::ReadyForPickup,
    ShipmentStatus::PickedUpCompleted,
];

/// The ordered ladder that applies to a shipment.
///
/// Without a mode only the common flow is sequenced.
pub fn ladder(mode: Option<TransportMode>) -> &'static [ShipmentStatus] {
    match mode {
        None => &COMMON_FLOW,
        Some(TransportMode::Air) => &AIR_LADDER,
        Some(TransportMode::Sea) => &SEA_LADDER,
    }
}

/// Position of `status` on the ladder for `mode`, if it is on it.
pub fn rank(mode: Option<TransportMode>, status: ShipmentStatus) -> Option<usize> {
    ladder(mode).iter().position(|s| *s == status)
}
