//! # In-Memory Collaborators
//!
//! Thread-safe implementations of the collaborator traits for tests and
//! operator tooling. Locks are `parking_lot` and never held across
//! `.await`, so every commit is applied under one write lock and is atomic
//! with respect to readers.
//!
//! Each type can be switched into a failing mode to exercise degradation
//! and persistence-failure paths.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};

use freight_core::{CustomerId, ShipmentId, TransportMode};
use freight_pricing::{CustomerPricingOverride, PricingRule, RateTable};

use crate::model::{MilestoneNotification, Package, Shipment, StatusEvent};
use crate::store::{
    NotificationError, NotificationSink, RateTableSource, ShipmentStore, StatusCommit,
    StoreError, VerificationCommit,
};

// ─── Shipment store ──────────────────────────────────────────────────

#[derive(Debug, Default)]
struct Tables {
    shipments: HashMap<ShipmentId, Shipment>,
    packages: HashMap<ShipmentId, Vec<Package>>,
    events: Vec<StatusEvent>,
}

/// Shipments, packages, and status events held in process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryShipmentStore {
    tables: Arc<RwLock<Tables>>,
    unavailable: Arc<AtomicBool>,
}

impl MemoryShipmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with [`StoreError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Status events recorded for a shipment, oldest first.
    pub fn events_for(&self, id: ShipmentId) -> Vec<StatusEvent> {
        self.tables
            .read()
            .events
            .iter()
            .filter(|e| e.shipment_id == id)
            .cloned()
            .collect()
    }

    /// Overwrite a shipment's stored record without any checks.
    pub fn put(&self, shipment: Shipment) {
        self.tables.write().shipments.insert(shipment.id, shipment);
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("in-memory store switched off".into()));
        }
        Ok(())
    }
}

fn compare_version(stored: &Shipment, expected_version: i64) -> Result<(), StoreError> {
    if stored.version != expected_version {
        return Err(StoreError::Conflict {
            shipment_id: stored.id,
            expected_version,
        });
    }
    Ok(())
}

#[async_trait]
impl ShipmentStore for MemoryShipmentStore {
    async fn create(&self, shipment: &Shipment) -> Result<(), StoreError> {
        self.check_available()?;
        let mut tables = self.tables.write();
        if tables.shipments.contains_key(&shipment.id) {
            return Err(StoreError::Conflict {
                shipment_id: shipment.id,
                expected_version: shipment.version,
            });
        }
        tables.shipments.insert(shipment.id, shipment.clone());
        Ok(())
    }

    async fn load(&self, id: ShipmentId) -> Result<Option<Shipment>, StoreError> {
        self.check_available()?;
        Ok(self.tables.read().shipments.get(&id).cloned())
    }

    async fn load_packages(&self, id: ShipmentId) -> Result<Vec<Package>, StoreError> {
        self.check_available()?;
        Ok(self
            .tables
            .read()
            .packages
            .get(&id)
            .cloned()
            .unwrap_or_default())
    }

    async fn commit_verification(
        &self,
        commit: VerificationCommit,
    ) -> Result<Shipment, StoreError> {
        self.check_available()?;
        let id = commit.shipment.id;
        let mut tables = self.tables.write();
        let stored = tables
            .shipments
            .get_mut(&id)
            .ok_or(StoreError::NotFound(id))?;
        compare_version(stored, commit.expected_version)?;

        stored.apply_verification(&commit.shipment);
        stored.version += 1;
        let updated = stored.clone();
        tables.packages.insert(id, commit.packages);
        tables.events.push(commit.event);
        Ok(updated)
    }

    async fn commit_status(&self, commit: StatusCommit) -> Result<Shipment, StoreError> {
        self.check_available()?;
        let mut tables = self.tables.write();
        let stored = tables
            .shipments
            .get_mut(&commit.shipment_id)
            .ok_or(StoreError::NotFound(commit.shipment_id))?;
        compare_version(stored, commit.expected_version)?;

        stored.status = Some(commit.new_status);
        stored.resume_from = commit.resume_from;
        stored.updated_at = commit.updated_at;
        stored.version += 1;
        let updated = stored.clone();
        tables.events.push(commit.event);
        Ok(updated)
    }
}

// ─── Rate tables ─────────────────────────────────────────────────────

/// Rate tables served from a loaded [`RateTable`].
#[derive(Debug, Clone, Default)]
pub struct StaticRateTables {
    table: Arc<RwLock<RateTable>>,
    overrides_unavailable: Arc<AtomicBool>,
    defaults_unavailable: Arc<AtomicBool>,
}

impl StaticRateTables {
    pub fn new(table: RateTable) -> Self {
        Self {
            table: Arc::new(RwLock::new(table)),
            ..Default::default()
        }
    }

    /// Replace the served table.
    pub fn replace(&self, table: RateTable) {
        *self.table.write() = table;
    }

    /// Make override lookups fail.
    pub fn set_overrides_unavailable(&self, unavailable: bool) {
        self.overrides_unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Make default-rule lookups fail.
    pub fn set_defaults_unavailable(&self, unavailable: bool) {
        self.defaults_unavailable.store(unavailable, Ordering::SeqCst);
    }
}

#[async_trait]
impl RateTableSource for StaticRateTables {
    async fn default_rules(&self, mode: TransportMode) -> Result<Vec<PricingRule>, StoreError> {
        if self.defaults_unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("pricing_rules".into()));
        }
        Ok(self.table.read().default_rules(mode))
    }

    async fn customer_overrides(
        &self,
        customer: CustomerId,
        mode: TransportMode,
    ) -> Result<Vec<CustomerPricingOverride>, StoreError> {
        if self.overrides_unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("customer_pricing_overrides".into()));
        }
        Ok(self.table.read().overrides_for(customer, mode))
    }
}

// ─── Notifications ───────────────────────────────────────────────────

/// Keeps every notification it is handed.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<MilestoneNotification>>>,
    failing: Arc<AtomicBool>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make delivery fail. Failed notifications are not recorded.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<MilestoneNotification> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl NotificationSink for RecordingNotifier {
    async fn notify(&self, notification: &MilestoneNotification) -> Result<(), NotificationError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotificationError("recording notifier switched off".into()));
        }
        self.sent.lock().push(notification.clone());
        Ok(())
    }
}

/// Writes notifications to the log instead of delivering them.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

#[async_trait]
impl NotificationSink for TracingNotifier {
    async fn notify(&self, notification: &MilestoneNotification) -> Result<(), NotificationError> {
        tracing::info!(
            shipment_id = %notification.shipment_id,
            tracking_number = %notification.tracking_number,
            status = %notification.status,
            recipient = notification.recipient_contact.as_deref().unwrap_or("-"),
            "milestone notification: {}",
            notification.status_label
        );
        Ok(())
    }
}
