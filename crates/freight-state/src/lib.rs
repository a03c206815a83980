//! # freight-state — Shipment Status State Machine
//!
//! Decides which status transitions are legal for a shipment and what the
//! customer sees for each status.
//!
//! ## States
//!
//! ```text
//!  SUBMITTED ─▶ AWAITING_WAREHOUSE_RECEIPT ─▶ RECEIVED_AT_WAREHOUSE ─▶ WAREHOUSE_VERIFIED_PRICED
//!                                                                              │
//!                        ┌──────────────────── AIR ────────────────────────────┤
//!                        ▼                                                     │
//!  DISPATCHED_TO_ORIGIN_AIRPORT ─▶ AT_ORIGIN_AIRPORT ─▶ BOARDED_ON_FLIGHT      │
//!        ─▶ FLIGHT_DEPARTED ─▶ FLIGHT_LANDED ──┐                               │
//!                                              │     ┌────── SEA ──────────────┘
//!                                              │     ▼
//!                                              │  DISPATCHED_TO_ORIGIN_PORT ─▶ AT_ORIGIN_PORT
//!                                              │     ─▶ LOADED_ON_VESSEL ─▶ VESSEL_DEPARTED
//!                                              │     ─▶ VESSEL_ARRIVED ──┐
//!                                              ▼                         ▼
//!  CUSTOMS_CLEARED ─▶ IN_TRANSIT_TO_DESTINATION_OFFICE ─▶ READY_FOR_PICKUP ─▶ PICKED_UP_COMPLETED
//!
//!  Exceptions (reachable from anywhere):
//!  ON_HOLD, CANCELLED, RESTRICTED_ITEM_REJECTED, RESTRICTED_ITEM_OVERRIDE_APPROVED
//! ```
//!
//! `ON_HOLD` and `RESTRICTED_ITEM_OVERRIDE_APPROVED` resume at or above the
//! ladder status held when the shipment entered the exception.
//!
//! ## Design Decision
//!
//! The ladder is a flat ordered slice per mode rather than a typestate chain.
//! Operators may skip forward over intermediate statuses, which a typestate
//! encoding cannot express without a transition per pair. Ranks in the slice
//! give forward-only sequencing with one comparison.
//!
//! Only one status is authoritative. The customer-facing status is always
//! derived through [`CustomerStatus::project`], never stored independently.

pub mod customer;
pub mod ladder;
pub mod status;
pub mod transition;

pub use customer::CustomerStatus;
pub use ladder::{ladder, rank, AIR_LADDER, COMMON_FLOW, SEA_LADDER};
pub use status::ShipmentStatus;
pub use transition::{
    accepts_warehouse_verification, allowed_targets, can_transition_sequentially, resume_point,
    validate_transition, TransitionError,
};
