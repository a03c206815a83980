//! # Collaborator Seams
//!
//! Traits the orchestrator is built against. All are object-safe and
//! `Send + Sync` so a service can hold them as `Arc<dyn ...>`.
//!
//! Store commits carry the version the caller read (`expected_version`).
//! Implementations apply them only if the stored version still matches,
//! bump it, and report [`StoreError::Conflict`] otherwise. A commit either
//! lands whole or not at all.
//!
//! Comparing versions rather than statuses also catches a write that
//! leaves the status where it was, such as a second re-verification.

use async_trait::async_trait;
use thiserror::Error;

use freight_core::{CustomerId, ShipmentId, Timestamp, TransportMode};
use freight_pricing::{CustomerPricingOverride, PricingRule};
use freight_state::ShipmentStatus;

use crate::model::{MilestoneNotification, Package, Shipment, StatusEvent};

/// Storage failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(ShipmentId),

    /// The stored version no longer matches what the caller read.
    #[error("{shipment_id} changed concurrently: expected version {expected_version}")]
    Conflict {
        shipment_id: ShipmentId,
        expected_version: i64,
    },

    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// A stored value could not be decoded.
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

/// Everything warehouse verification writes, applied atomically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationCommit {
    /// The shipment with its verified mode, measurements, and pricing.
    /// Only the verification-owned fields are written.
    pub shipment: Shipment,
    pub expected_version: i64,
    /// Replaces every existing package of the shipment.
    pub packages: Vec<Package>,
    pub event: StatusEvent,
}

/// A single status change, applied atomically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusCommit {
    pub shipment_id: ShipmentId,
    pub expected_version: i64,
    pub new_status: ShipmentStatus,
    /// Resume point to store alongside `new_status`.
    pub resume_from: Option<ShipmentStatus>,
    pub updated_at: Timestamp,
    pub event: StatusEvent,
}

/// Shipment and package persistence.
#[async_trait]
pub trait ShipmentStore: Send + Sync {
    /// Insert a new shipment.
    async fn create(&self, shipment: &Shipment) -> Result<(), StoreError>;

    async fn load(&self, id: ShipmentId) -> Result<Option<Shipment>, StoreError>;

    async fn load_packages(&self, id: ShipmentId) -> Result<Vec<Package>, StoreError>;

    /// Replace packages, update the shipment, and append the event.
    async fn commit_verification(&self, commit: VerificationCommit)
        -> Result<Shipment, StoreError>;

    /// Set the new status and append the event.
    async fn commit_status(&self, commit: StatusCommit) -> Result<Shipment, StoreError>;
}

/// Read access to the configured rate tables.
#[async_trait]
pub trait RateTableSource: Send + Sync {
    async fn default_rules(&self, mode: TransportMode) -> Result<Vec<PricingRule>, StoreError>;

    async fn customer_overrides(
        &self,
        customer: CustomerId,
        mode: TransportMode,
    ) -> Result<Vec<CustomerPricingOverride>, StoreError>;
}

/// Delivery failure reported by a notification sink.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("notification dispatch failed: {0}")]
pub struct NotificationError(pub String);

/// Hands milestone notifications to the delivery collaborator.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, notification: &MilestoneNotification) -> Result<(), NotificationError>;
}
