//! # Records
//!
//! The shipment, its packages, the append-only status events, and the
//! notification payload handed to the delivery collaborator.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use freight_core::{
    ActorId, CustomerId, PackageId, PaymentCollectionStatus, ShipmentId, Timestamp,
    TransportMode,
};
use freight_pricing::PricingSource;
use freight_state::{CustomerStatus, ShipmentStatus};
use freight_warehouse::NormalizedPackage;

/// One customer consignment.
///
/// `status` is the only lifecycle field; the customer view is derived
/// by [`Shipment::customer_status`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shipment {
    pub id: ShipmentId,
    pub tracking_number: String,
    pub sender_id: CustomerId,
    pub recipient_contact: Option<String>,
    /// Unset until warehouse verification, immutable afterwards.
    pub transport_mode: Option<TransportMode>,
    pub status: Option<ShipmentStatus>,
    /// Ladder status held before the current exception, if any.
    #[serde(default)]
    pub resume_from: Option<ShipmentStatus>,
    pub payment_status: PaymentCollectionStatus,
    pub weight_kg: Option<Decimal>,
    pub cbm: Option<Decimal>,
    pub calculated_charge_usd: Option<Decimal>,
    pub final_charge_usd: Option<Decimal>,
    pub pricing_source: Option<PricingSource>,
    pub price_adjustment_reason: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    /// Bumped by every store commit; commits are guarded by it.
    #[serde(default)]
    pub version: i64,
}

impl Shipment {
    /// A freshly submitted shipment with nothing measured or priced.
    pub fn new(tracking_number: impl Into<String>, sender_id: CustomerId) -> Self {
        let now = Timestamp::now();
        Self {
            id: ShipmentId::new(),
            tracking_number: tracking_number.into(),
            sender_id,
            recipient_contact: None,
            transport_mode: None,
            status: Some(ShipmentStatus::Submitted),
            resume_from: None,
            payment_status: PaymentCollectionStatus::Unpaid,
            weight_kg: None,
            cbm: None,
            calculated_charge_usd: None,
            final_charge_usd: None,
            pricing_source: None,
            price_adjustment_reason: None,
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }

    /// Customer-facing projection of `status`.
    pub fn customer_status(&self) -> CustomerStatus {
        CustomerStatus::project(self.status)
    }

    /// Copy the fields warehouse verification owns from `verified`.
    ///
    /// Identity, contact, payment, and creation time stay as stored.
    pub fn apply_verification(&mut self, verified: &Shipment) {
        self.transport_mode = verified.transport_mode;
        self.status = verified.status;
        self.resume_from = verified.resume_from;
        self.weight_kg = verified.weight_kg;
        self.cbm = verified.cbm;
        self.calculated_charge_usd = verified.calculated_charge_usd;
        self.final_charge_usd = verified.final_charge_usd;
        self.pricing_source = verified.pricing_source;
        self.price_adjustment_reason = verified.price_adjustment_reason.clone();
        self.updated_at = verified.updated_at;
    }
}

/// A stored package row. Replaced wholesale on every verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub id: PackageId,
    pub shipment_id: ShipmentId,
    #[serde(flatten)]
    pub details: NormalizedPackage,
    pub created_at: Timestamp,
}

impl Package {
    pub fn new(shipment_id: ShipmentId, details: NormalizedPackage, created_at: Timestamp) -> Self {
        Self {
            id: PackageId::new(),
            shipment_id,
            details,
            created_at,
        }
    }
}

/// Immutable record of one accepted transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEvent {
    pub id: Uuid,
    pub shipment_id: ShipmentId,
    pub status: ShipmentStatus,
    pub actor_id: ActorId,
    pub timestamp: Timestamp,
}

impl StatusEvent {
    pub fn new(
        shipment_id: ShipmentId,
        status: ShipmentStatus,
        actor_id: ActorId,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            shipment_id,
            status,
            actor_id,
            timestamp,
        }
    }
}

/// Payload for the notification-dispatch collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestoneNotification {
    pub shipment_id: ShipmentId,
    pub tracking_number: String,
    pub status: ShipmentStatus,
    pub status_label: String,
    pub customer_message: String,
    pub recipient_contact: Option<String>,
}

impl MilestoneNotification {
    /// Build the payload for `shipment` having just entered its current status.
    ///
    /// Returns `None` when the status is not a milestone.
    pub fn for_shipment(shipment: &Shipment) -> Option<Self> {
        let status = shipment.status.filter(ShipmentStatus::is_milestone)?;
        Some(Self {
            shipment_id: shipment.id,
            tracking_number: shipment.tracking_number.clone(),
            status,
            status_label: status.label().to_string(),
            customer_message: status.customer_message().to_string(),
            recipient_contact: shipment.recipient_contact.clone(),
        })
    }
}
