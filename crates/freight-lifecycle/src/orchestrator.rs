//! # Lifecycle Orchestrator
//!
//! ## Warehouse verification
//!
//! ```text
//! load ─▶ eligibility ─▶ manual adjustment check ─▶ normalize packages
//!      ─▶ resolve rate + price ─▶ commit (packages, shipment, event) ─▶ notify
//! ```
//!
//! ## Status advancement
//!
//! ```text
//! load ─▶ validate transition ─▶ commit (status, event) ─▶ notify if milestone
//! ```
//!
//! Every check runs before the single commit, so a rejected request leaves
//! the shipment and its packages untouched. Notification runs after the
//! commit and its failure is only logged.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use freight_core::{ActorId, CustomerId, ShipmentId, Timestamp, TransportMode};
use freight_pricing::{quote, ManualAdjustment, PricingQuote, PricingSource, RateQuery};
use freight_state::{
    accepts_warehouse_verification, resume_point, validate_transition, ShipmentStatus,
};
use freight_warehouse::{normalize, NormalizationInput, RawPackage};

use crate::error::LifecycleError;
use crate::model::{MilestoneNotification, Package, Shipment, StatusEvent};
use crate::store::{
    NotificationSink, RateTableSource, ShipmentStore, StatusCommit, VerificationCommit,
};

/// Warehouse verification request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationInput {
    /// Required unless the shipment already has a mode.
    #[serde(default)]
    pub transport_mode: Option<TransportMode>,
    pub packages: Vec<RawPackage>,
    /// Operator charge replacing the computed one.
    #[serde(default)]
    pub manual_charge_usd: Option<Decimal>,
    #[serde(default)]
    pub price_adjustment_reason: Option<String>,
}

/// Outcome of a successful verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedShipment {
    pub shipment: Shipment,
    pub packages: Vec<Package>,
    /// The computed price, recorded even when a manual charge was applied.
    pub quote: PricingQuote,
}

/// Entry point for lifecycle operations.
#[derive(Clone)]
pub struct Lifecycle {
    store: Arc<dyn ShipmentStore>,
    rates: Arc<dyn RateTableSource>,
    notifier: Arc<dyn NotificationSink>,
}

impl std::fmt::Debug for Lifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lifecycle").finish_non_exhaustive()
    }
}

impl Lifecycle {
    pub fn new(
        store: Arc<dyn ShipmentStore>,
        rates: Arc<dyn RateTableSource>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            store,
            rates,
            notifier,
        }
    }

    async fn load(&self, id: ShipmentId) -> Result<Shipment, LifecycleError> {
        self.store
            .load(id)
            .await
            .map_err(|e| self.persistence(id, e))?
            .ok_or(LifecycleError::NotFound(id))
    }

    fn persistence(&self, id: ShipmentId, e: crate::store::StoreError) -> LifecycleError {
        let err = LifecycleError::from(e);
        if !err.kind().is_client_error() {
            tracing::error!(shipment_id = %id, error = %err, "shipment store failure");
        }
        err
    }

    /// Price a billable quantity against the configured tables.
    ///
    /// A table that cannot be read is skipped; the built-in tariff is the
    /// last resort. Only a non-positive quantity fails.
    pub async fn price(
        &self,
        customer: Option<CustomerId>,
        mode: TransportMode,
        quantity: Decimal,
        as_of: Timestamp,
    ) -> Result<PricingQuote, LifecycleError> {
        let overrides = match customer {
            Some(customer) => match self.rates.customer_overrides(customer, mode).await {
                Ok(rows) => Some(rows),
                Err(e) => {
                    tracing::debug!(%customer, error = %e, "customer override lookup failed");
                    None
                }
            },
            None => Some(Vec::new()),
        };
        let defaults = match self.rates.default_rules(mode).await {
            Ok(rows) => Some(rows),
            Err(e) => {
                tracing::debug!(%mode, error = %e, "default rule lookup failed");
                None
            }
        };

        let query = RateQuery {
            customer_id: customer,
            mode,
            quantity,
            as_of,
        };
        Ok(quote(&query, overrides.as_deref(), defaults.as_deref())?)
    }

    /// Measure, price, and mark a shipment verified at the origin warehouse.
    ///
    /// Re-running with the same input replaces the packages and produces
    /// the same charge.
    pub async fn verify_order_at_warehouse(
        &self,
        shipment_id: ShipmentId,
        input: VerificationInput,
        actor: &ActorId,
    ) -> Result<VerifiedShipment, LifecycleError> {
        let shipment = self.load(shipment_id).await?;

        if let Some(status) = shipment.status {
            if !accepts_warehouse_verification(Some(status), shipment.resume_from) {
                return Err(LifecycleError::VerificationNotAllowed { status });
            }
        }

        let manual = ManualAdjustment::from_parts(
            input.manual_charge_usd,
            input.price_adjustment_reason.as_deref(),
        )?;

        let normalized = normalize(&NormalizationInput {
            requested_mode: input.transport_mode,
            recorded_mode: shipment.transport_mode,
            previous_weight_kg: shipment.weight_kg,
            packages: input.packages,
        })?;
        let mode = normalized.mode;

        let now = Timestamp::now();
        let quote = self
            .price(Some(shipment.sender_id), mode, normalized.billable_quantity, now)
            .await?;

        let mut updated = shipment.clone();
        updated.transport_mode = Some(mode);
        updated.status = Some(ShipmentStatus::WarehouseVerifiedPriced);
        updated.resume_from = None;
        updated.weight_kg = match mode {
            TransportMode::Air => Some(normalized.billable_quantity),
            TransportMode::Sea if normalized.total_weight_kg > Decimal::ZERO => {
                Some(normalized.total_weight_kg)
            }
            TransportMode::Sea => shipment.weight_kg,
        };
        if normalized.total_cbm > Decimal::ZERO {
            updated.cbm = Some(normalized.total_cbm);
        }
        updated.calculated_charge_usd = Some(quote.amount_usd);
        match &manual {
            Some(adjustment) => {
                updated.final_charge_usd = Some(adjustment.charge_usd);
                updated.pricing_source = Some(PricingSource::ManualAdjustment);
                updated.price_adjustment_reason = Some(adjustment.reason.clone());
            }
            None => {
                updated.final_charge_usd = Some(quote.amount_usd);
                updated.pricing_source = Some(quote.pricing_source);
                updated.price_adjustment_reason = None;
            }
        }
        updated.updated_at = now;

        let packages: Vec<Package> = normalized
            .packages
            .into_iter()
            .map(|details| Package::new(shipment_id, details, now))
            .collect();

        let commit = VerificationCommit {
            shipment: updated,
            expected_version: shipment.version,
            packages: packages.clone(),
            event: StatusEvent::new(
                shipment_id,
                ShipmentStatus::WarehouseVerifiedPriced,
                actor.clone(),
                now,
            ),
        };
        let saved = self
            .store
            .commit_verification(commit)
            .await
            .map_err(|e| self.persistence(shipment_id, e))?;

        tracing::info!(
            shipment_id = %shipment_id,
            actor = %actor,
            mode = %mode,
            billable = %quote.quantity,
            charge_usd = ?saved.final_charge_usd,
            pricing_source = ?saved.pricing_source,
            packages = packages.len(),
            "shipment verified at warehouse"
        );

        self.notify(&saved).await;

        Ok(VerifiedShipment {
            shipment: saved,
            packages,
            quote,
        })
    }

    /// Move a shipment to `target` if the state machine allows it.
    pub async fn advance_status(
        &self,
        shipment_id: ShipmentId,
        target: ShipmentStatus,
        actor: &ActorId,
    ) -> Result<Shipment, LifecycleError> {
        let shipment = self.load(shipment_id).await?;

        if let Err(e) = validate_transition(
            shipment.transport_mode,
            shipment.status,
            shipment.resume_from,
            target,
            shipment.payment_status,
        ) {
            tracing::debug!(
                shipment_id = %shipment_id,
                current = ?shipment.status,
                resume_from = ?shipment.resume_from,
                target = %target,
                error = %e,
                "status transition rejected"
            );
            return Err(e.into());
        }

        let now = Timestamp::now();
        let commit = StatusCommit {
            shipment_id,
            expected_version: shipment.version,
            new_status: target,
            resume_from: resume_point(shipment.status, shipment.resume_from, target),
            updated_at: now,
            event: StatusEvent::new(shipment_id, target, actor.clone(), now),
        };
        let saved = self
            .store
            .commit_status(commit)
            .await
            .map_err(|e| self.persistence(shipment_id, e))?;

        tracing::info!(
            shipment_id = %shipment_id,
            actor = %actor,
            from = ?shipment.status,
            to = %target,
            "shipment status advanced"
        );

        self.notify(&saved).await;
        Ok(saved)
    }

    async fn notify(&self, shipment: &Shipment) {
        let Some(notification) = MilestoneNotification::for_shipment(shipment) else {
            return;
        };
        if let Err(e) = self.notifier.notify(&notification).await {
            tracing::warn!(
                shipment_id = %shipment.id,
                status = %notification.status,
                error = %e,
                "milestone notification failed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use freight_core::PaymentCollectionStatus;
    use freight_pricing::{PricingError, RateTable};
    use freight_state::TransitionError;
    use freight_warehouse::PackageError;

    use super::*;
    use crate::error::ErrorKind;
    use crate::memory::{MemoryShipmentStore, RecordingNotifier, StaticRateTables};

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    struct Harness {
        store: MemoryShipmentStore,
        rates: StaticRateTables,
        notifier: RecordingNotifier,
        lifecycle: Lifecycle,
        actor: ActorId,
    }

    fn harness() -> Harness {
        let store = MemoryShipmentStore::new();
        let rates = StaticRateTables::new(RateTable::default());
        let notifier = RecordingNotifier::new();
        let lifecycle = Lifecycle::new(
            Arc::new(store.clone()),
            Arc::new(rates.clone()),
            Arc::new(notifier.clone()),
        );
        Harness {
            store,
            rates,
            notifier,
            lifecycle,
            actor: ActorId::new("warehouse-op-1"),
        }
    }

    async fn seed(h: &Harness) -> Shipment {
        let mut shipment = Shipment::new("FL-1001", CustomerId::new());
        shipment.recipient_contact = Some("recipient@example.com".into());
        h.store.create(&shipment).await.unwrap();
        shipment
    }

    fn air_input(kg: &str) -> VerificationInput {
        VerificationInput {
            transport_mode: Some(TransportMode::Air),
            packages: vec![RawPackage {
                weight_kg: Some(d(kg)),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn verification_prices_and_records() {
        let h = harness();
        let shipment = seed(&h).await;

        let out = h
            .lifecycle
            .verify_order_at_warehouse(shipment.id, air_input("110.5"), &h.actor)
            .await
            .unwrap();

        assert_eq!(out.shipment.status, Some(ShipmentStatus::WarehouseVerifiedPriced));
        assert_eq!(out.shipment.transport_mode, Some(TransportMode::Air));
        assert_eq!(out.shipment.final_charge_usd, Some(d("1270.75")));
        assert_eq!(out.shipment.calculated_charge_usd, Some(d("1270.75")));
        assert_eq!(out.shipment.pricing_source, Some(PricingSource::FallbackTariff));
        assert_eq!(out.shipment.weight_kg, Some(d("110.5")));

        let events = h.store.events_for(shipment.id);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].status, ShipmentStatus::WarehouseVerifiedPriced);
        assert_eq!(events[0].actor_id, h.actor);

        let sent = h.notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].status, ShipmentStatus::WarehouseVerifiedPriced);
        assert_eq!(sent[0].tracking_number, "FL-1001");
    }

    #[tokio::test]
    async fn reverification_replaces_packages_without_double_charging() {
        let h = harness();
        let shipment = seed(&h).await;
        let input = VerificationInput {
            transport_mode: Some(TransportMode::Sea),
            packages: vec![
                RawPackage {
                    cbm: Some(d("1.034")),
                    ..Default::default()
                },
                RawPackage {
                    length_cm: Some(d("100")),
                    width_cm: Some(d("50")),
                    height_cm: Some(d("40")),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };

        let first = h
            .lifecycle
            .verify_order_at_warehouse(shipment.id, input.clone(), &h.actor)
            .await
            .unwrap();
        let second = h
            .lifecycle
            .verify_order_at_warehouse(shipment.id, input, &h.actor)
            .await
            .unwrap();

        assert_eq!(first.shipment.final_charge_usd, Some(d("678.70")));
        assert_eq!(second.shipment.final_charge_usd, first.shipment.final_charge_usd);
        assert_eq!(second.shipment.cbm, Some(d("1.234")));

        let stored = h.store.load_packages(shipment.id).await.unwrap();
        assert_eq!(stored.len(), 2);
        assert!(stored.iter().all(|p| second.packages.contains(p)));
        assert!(stored.iter().all(|p| !first.packages.iter().any(|f| f.id == p.id)));
    }

    #[tokio::test]
    async fn invalid_input_leaves_shipment_untouched() {
        let h = harness();
        let shipment = seed(&h).await;

        let empty = VerificationInput {
            transport_mode: Some(TransportMode::Air),
            ..Default::default()
        };
        let err = h
            .lifecycle
            .verify_order_at_warehouse(shipment.id, empty, &h.actor)
            .await
            .unwrap_err();
        assert!(matches!(err, LifecycleError::Package(PackageError::EmptyPackageList)));
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let mut unreasoned = air_input("10");
        unreasoned.manual_charge_usd = Some(d("50"));
        let err = h
            .lifecycle
            .verify_order_at_warehouse(shipment.id, unreasoned, &h.actor)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LifecycleError::Pricing(PricingError::MissingAdjustmentReason)
        ));

        assert_eq!(h.store.load(shipment.id).await.unwrap(), Some(shipment.clone()));
        assert!(h.store.load_packages(shipment.id).await.unwrap().is_empty());
        assert!(h.store.events_for(shipment.id).is_empty());
        assert!(h.notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn manual_adjustment_overrides_final_charge() {
        let h = harness();
        let shipment = seed(&h).await;
        let mut input = air_input("10");
        input.manual_charge_usd = Some(d("99.5"));
        input.price_adjustment_reason = Some("loyalty discount".into());

        let out = h
            .lifecycle
            .verify_order_at_warehouse(shipment.id, input, &h.actor)
            .await
            .unwrap();
        assert_eq!(out.shipment.final_charge_usd, Some(d("99.50")));
        assert_eq!(out.shipment.calculated_charge_usd, Some(d("135.00")));
        assert_eq!(out.shipment.pricing_source, Some(PricingSource::ManualAdjustment));
        assert_eq!(
            out.shipment.price_adjustment_reason.as_deref(),
            Some("loyalty discount")
        );
    }

    #[tokio::test]
    async fn mode_cannot_change_after_verification() {
        let h = harness();
        let shipment = seed(&h).await;
        h.lifecycle
            .verify_order_at_warehouse(shipment.id, air_input("5"), &h.actor)
            .await
            .unwrap();

        let mut sea = air_input("5");
        sea.transport_mode = Some(TransportMode::Sea);
        let err = h
            .lifecycle
            .verify_order_at_warehouse(shipment.id, sea, &h.actor)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LifecycleError::Package(PackageError::ModeConflict { .. })
        ));

        let mut implicit = air_input("6");
        implicit.transport_mode = None;
        let out = h
            .lifecycle
            .verify_order_at_warehouse(shipment.id, implicit, &h.actor)
            .await
            .unwrap();
        assert_eq!(out.shipment.transport_mode, Some(TransportMode::Air));
    }

    #[tokio::test]
    async fn verification_refused_after_departure() {
        let h = harness();
        let mut shipment = seed(&h).await;
        shipment.transport_mode = Some(TransportMode::Air);
        shipment.status = Some(ShipmentStatus::FlightDeparted);
        h.store.put(shipment.clone());

        let err = h
            .lifecycle
            .verify_order_at_warehouse(shipment.id, air_input("5"), &h.actor)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TransitionNotAllowed);
    }

    #[tokio::test]
    async fn hold_after_landing_cannot_move_backward() {
        let h = harness();
        let shipment = seed(&h).await;
        h.lifecycle
            .verify_order_at_warehouse(shipment.id, air_input("450"), &h.actor)
            .await
            .unwrap();
        h.lifecycle
            .advance_status(shipment.id, ShipmentStatus::FlightLanded, &h.actor)
            .await
            .unwrap();
        let held = h
            .lifecycle
            .advance_status(shipment.id, ShipmentStatus::OnHold, &h.actor)
            .await
            .unwrap();
        assert_eq!(held.resume_from, Some(ShipmentStatus::FlightLanded));

        let err = h
            .lifecycle
            .advance_status(shipment.id, ShipmentStatus::Submitted, &h.actor)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LifecycleError::Transition(TransitionError::BackwardResume { .. })
        ));
        assert_eq!(err.kind(), ErrorKind::TransitionNotAllowed);

        let resumed = h
            .lifecycle
            .advance_status(shipment.id, ShipmentStatus::CustomsCleared, &h.actor)
            .await
            .unwrap();
        assert_eq!(resumed.status, Some(ShipmentStatus::CustomsCleared));
        assert_eq!(resumed.resume_from, None);
    }

    #[tokio::test]
    async fn hold_after_departure_does_not_reopen_verification() {
        let h = harness();
        let shipment = seed(&h).await;
        let verified = h
            .lifecycle
            .verify_order_at_warehouse(shipment.id, air_input("450"), &h.actor)
            .await
            .unwrap();
        h.lifecycle
            .advance_status(shipment.id, ShipmentStatus::FlightLanded, &h.actor)
            .await
            .unwrap();
        h.lifecycle
            .advance_status(shipment.id, ShipmentStatus::OnHold, &h.actor)
            .await
            .unwrap();
        let events = h.store.events_for(shipment.id).len();

        let err = h
            .lifecycle
            .verify_order_at_warehouse(shipment.id, air_input("5"), &h.actor)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LifecycleError::VerificationNotAllowed {
                status: ShipmentStatus::OnHold
            }
        ));

        let stored = h.store.load(shipment.id).await.unwrap().unwrap();
        assert_eq!(stored.status, Some(ShipmentStatus::OnHold));
        assert_eq!(stored.final_charge_usd, verified.shipment.final_charge_usd);
        assert_eq!(h.store.events_for(shipment.id).len(), events);
    }

    #[tokio::test]
    async fn hold_at_warehouse_can_be_reverified() {
        let h = harness();
        let shipment = seed(&h).await;
        h.lifecycle
            .advance_status(shipment.id, ShipmentStatus::ReceivedAtWarehouse, &h.actor)
            .await
            .unwrap();
        let held = h
            .lifecycle
            .advance_status(shipment.id, ShipmentStatus::OnHold, &h.actor)
            .await
            .unwrap();
        assert_eq!(held.resume_from, Some(ShipmentStatus::ReceivedAtWarehouse));

        let out = h
            .lifecycle
            .verify_order_at_warehouse(shipment.id, air_input("12"), &h.actor)
            .await
            .unwrap();
        assert_eq!(out.shipment.status, Some(ShipmentStatus::WarehouseVerifiedPriced));
        assert_eq!(out.shipment.resume_from, None);
    }

    #[tokio::test]
    async fn oversized_measurements_are_invalid_input() {
        let h = harness();
        let shipment = seed(&h).await;

        let huge = Decimal::from_str("100000000000000000000").unwrap();
        let oversized_box = VerificationInput {
            transport_mode: Some(TransportMode::Sea),
            packages: vec![RawPackage {
                length_cm: Some(huge),
                width_cm: Some(huge),
                height_cm: Some(huge),
                ..Default::default()
            }],
            ..Default::default()
        };
        let err = h
            .lifecycle
            .verify_order_at_warehouse(shipment.id, oversized_box, &h.actor)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LifecycleError::Package(PackageError::MeasurementOutOfRange { .. })
        ));
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let heavy = RawPackage {
            weight_kg: Some(Decimal::MAX),
            ..Default::default()
        };
        let two_heavy = VerificationInput {
            transport_mode: Some(TransportMode::Air),
            packages: vec![heavy.clone(), heavy.clone()],
            ..Default::default()
        };
        let err = h
            .lifecycle
            .verify_order_at_warehouse(shipment.id, two_heavy, &h.actor)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let one_heavy = VerificationInput {
            transport_mode: Some(TransportMode::Air),
            packages: vec![heavy],
            ..Default::default()
        };
        let err = h
            .lifecycle
            .verify_order_at_warehouse(shipment.id, one_heavy, &h.actor)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LifecycleError::Pricing(PricingError::AmountOutOfRange { .. })
        ));

        assert_eq!(h.store.load(shipment.id).await.unwrap(), Some(shipment.clone()));
        assert!(h.store.events_for(shipment.id).is_empty());
    }

    #[tokio::test]
    async fn unavailable_rate_tables_fall_back_to_tariff() {
        let h = harness();
        h.rates.set_defaults_unavailable(true);
        h.rates.set_overrides_unavailable(true);
        let shipment = seed(&h).await;

        let out = h
            .lifecycle
            .verify_order_at_warehouse(shipment.id, air_input("1600"), &h.actor)
            .await
            .unwrap();
        assert_eq!(out.quote.unit_rate, d("9.8"));
        assert_eq!(out.shipment.pricing_source, Some(PricingSource::FallbackTariff));
    }

    #[tokio::test]
    async fn forward_jump_then_payment_gate() {
        let h = harness();
        let shipment = seed(&h).await;
        h.lifecycle
            .verify_order_at_warehouse(shipment.id, air_input("20"), &h.actor)
            .await
            .unwrap();

        let departed = h
            .lifecycle
            .advance_status(shipment.id, ShipmentStatus::FlightDeparted, &h.actor)
            .await
            .unwrap();
        assert_eq!(departed.status, Some(ShipmentStatus::FlightDeparted));

        let err = h
            .lifecycle
            .advance_status(shipment.id, ShipmentStatus::ReadyForPickup, &h.actor)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LifecycleError::Transition(TransitionError::PaymentRequired { .. })
        ));
        assert_eq!(err.status_code(), 409);
        assert_eq!(
            h.store.load(shipment.id).await.unwrap().unwrap().status,
            Some(ShipmentStatus::FlightDeparted)
        );

        let mut paid = h.store.load(shipment.id).await.unwrap().unwrap();
        paid.payment_status = PaymentCollectionStatus::PaidInFull;
        h.store.put(paid);
        let ready = h
            .lifecycle
            .advance_status(shipment.id, ShipmentStatus::ReadyForPickup, &h.actor)
            .await
            .unwrap();
        assert_eq!(ready.status, Some(ShipmentStatus::ReadyForPickup));
    }

    #[tokio::test]
    async fn only_milestones_notify() {
        let h = harness();
        let shipment = seed(&h).await;
        h.lifecycle
            .verify_order_at_warehouse(shipment.id, air_input("20"), &h.actor)
            .await
            .unwrap();
        let before = h.notifier.sent().len();

        h.lifecycle
            .advance_status(shipment.id, ShipmentStatus::BoardedOnFlight, &h.actor)
            .await
            .unwrap();
        assert_eq!(h.notifier.sent().len(), before);

        h.lifecycle
            .advance_status(shipment.id, ShipmentStatus::FlightDeparted, &h.actor)
            .await
            .unwrap();
        let sent = h.notifier.sent();
        assert_eq!(sent.len(), before + 1);
        assert_eq!(sent[before].status_label, "Flight departed");
        assert_eq!(
            sent[before].recipient_contact.as_deref(),
            Some("recipient@example.com")
        );
    }

    #[tokio::test]
    async fn notification_failure_does_not_fail_transition() {
        let h = harness();
        let shipment = seed(&h).await;
        h.notifier.set_failing(true);

        let held = h
            .lifecycle
            .advance_status(shipment.id, ShipmentStatus::OnHold, &h.actor)
            .await
            .unwrap();
        assert_eq!(held.status, Some(ShipmentStatus::OnHold));
        assert_eq!(h.store.events_for(shipment.id).len(), 1);
    }

    #[tokio::test]
    async fn mode_guard_before_verification() {
        let h = harness();
        let shipment = seed(&h).await;
        let err = h
            .lifecycle
            .advance_status(shipment.id, ShipmentStatus::DispatchedToOriginAirport, &h.actor)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("warehouse verification"));
        assert!(h.store.events_for(shipment.id).is_empty());
    }

    #[tokio::test]
    async fn stale_read_is_a_conflict() {
        let h = harness();
        let shipment = seed(&h).await;
        let commit = StatusCommit {
            shipment_id: shipment.id,
            expected_version: shipment.version + 1,
            new_status: ShipmentStatus::WarehouseVerifiedPriced,
            resume_from: None,
            updated_at: Timestamp::now(),
            event: StatusEvent::new(
                shipment.id,
                ShipmentStatus::WarehouseVerifiedPriced,
                h.actor.clone(),
                Timestamp::now(),
            ),
        };
        let err: LifecycleError = h.store.commit_status(commit).await.unwrap_err().into();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert!(h.store.events_for(shipment.id).is_empty());
    }

    #[tokio::test]
    async fn missing_shipment_and_store_outage() {
        let h = harness();
        let err = h
            .lifecycle
            .advance_status(ShipmentId::new(), ShipmentStatus::OnHold, &h.actor)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let shipment = seed(&h).await;
        h.store.set_unavailable(true);
        let err = h
            .lifecycle
            .advance_status(shipment.id, ShipmentStatus::OnHold, &h.actor)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PersistenceFailure);
        assert!(!err.kind().is_client_error());
    }
}
