//! # freight-lifecycle — Lifecycle Orchestrator
//!
//! Composes the pricing, warehouse, and state crates into the two
//! operations the surrounding service calls:
//!
//! - [`Lifecycle::verify_order_at_warehouse`]: fix the mode, normalize
//!   packages, price, and commit the package replacement together with the
//!   verified-and-priced status.
//! - [`Lifecycle::advance_status`]: validate a transition, commit it, and
//!   notify the customer for milestone statuses.
//!
//! ## Collaborators
//!
//! The orchestrator owns no global state. Storage, rate tables, and
//! notification delivery are injected as trait objects ([`ShipmentStore`],
//! [`RateTableSource`], [`NotificationSink`]). [`memory`] provides
//! implementations for tests and tooling; `freight-db` provides PostgreSQL.
//!
//! ## Concurrency
//!
//! Every call runs inline on the caller's task. Each write is one store
//! commit guarded by the shipment version the orchestrator read, and every
//! commit bumps that version. Two overlapping requests on the same
//! shipment cannot both succeed, even when both leave the status unchanged
//! (two re-verifications): the loser gets [`ErrorKind::Conflict`] and must
//! reload.

pub mod error;
pub mod memory;
pub mod model;
pub mod orchestrator;
pub mod store;

pub use error::{ErrorKind, LifecycleError};
pub use model::{MilestoneNotification, Package, Shipment, StatusEvent};
pub use orchestrator::{Lifecycle, VerificationInput, VerifiedShipment};
pub use store::{
    NotificationError, NotificationSink, RateTableSource, ShipmentStore, StatusCommit,
    StoreError, VerificationCommit,
};
