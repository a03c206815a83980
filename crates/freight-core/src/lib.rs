//! # freight-core — Foundational Types for the Freight Lifecycle Core
//!
//! Every other crate in the workspace depends on `freight-core`; it depends
//! on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for identifiers.** `ShipmentId`, `CustomerId`,
//!    `PackageId`, `ActorId` are distinct types. A customer id cannot be
//!    passed where a shipment id is expected.
//!
//! 2. **Closed enums for modes and payment state.** `TransportMode` and
//!    `PaymentCollectionStatus` are exhaustive; adding a mode forces every
//!    ladder, tariff, and normalizer to handle it.
//!
//! 3. **Decimal arithmetic only.** Weights, volumes, rates, and charges are
//!    `rust_decimal::Decimal`. The rounding helpers in [`quantity`] are the
//!    single place where precision rules live.
//!
//! 4. **UTC-only timestamps.** [`Timestamp`] is always UTC, truncated to
//!    seconds.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `freight-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod identity;
pub mod mode;
pub mod quantity;
pub mod temporal;

pub use error::ValidationError;
pub use identity::{ActorId, CustomerId, PackageId, ShipmentId};
pub use mode::{PaymentCollectionStatus, TransportMode};
pub use quantity::{round_cbm, round_money, round_weight, CBM_SCALE, MONEY_SCALE, WEIGHT_SCALE};
pub use temporal::Timestamp;
