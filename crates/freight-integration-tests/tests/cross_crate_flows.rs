//! Full journeys through configuration, pricing, verification, and status
//! advancement.

use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::Decimal;

use freight_core::{ActorId, CustomerId, PaymentCollectionStatus, TransportMode};
use freight_lifecycle::memory::{MemoryShipmentStore, RecordingNotifier, StaticRateTables};
use freight_lifecycle::{
    ErrorKind, Lifecycle, Shipment, ShipmentStore, StatusCommit, StatusEvent, StoreError,
    VerificationInput,
};
use freight_pricing::{PricingSource, RateTable};
use freight_state::{CustomerStatus, ShipmentStatus, SEA_LADDER};
use freight_warehouse::RawPackage;

fn d(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn rate_table(customer: CustomerId) -> RateTable {
    let yaml = format!(
        r#"
rules:
  - name: sea standard
    basis: per_cbm
    rate_usd_per_cbm: "520"
  - name: air 0-100
    basis: per_kg
    min_weight_kg: "0"
    max_weight_kg: "100"
    rate_usd_per_kg: "13"
overrides:
  - name: contract sea
    customer_id: "{}"
    basis: per_cbm
    rate_usd_per_cbm: "480"
"#,
        customer.as_uuid()
    );
    RateTable::from_yaml_str(&yaml).unwrap()
}

fn sea_input() -> VerificationInput {
    VerificationInput {
        transport_mode: Some(TransportMode::Sea),
        packages: vec![
            RawPackage {
                quantity: Some(3),
                cbm: Some(d("1.5")),
                weight_kg: Some(d("210")),
                description: Some("machine parts".into()),
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
    }
}

#[tokio::test]
async fn sea_journey_with_customer_override() {
    let customer = CustomerId::new();
    let store = MemoryShipmentStore::new();
    let notifier = RecordingNotifier::new();
    let lifecycle = Lifecycle::new(
        Arc::new(store.clone()),
        Arc::new(StaticRateTables::new(rate_table(customer))),
        Arc::new(notifier.clone()),
    );
    let clerk = ActorId::new("clerk-1");

    let shipment = Shipment::new("FL-SEA-1", customer);
    store.create(&shipment).await.unwrap();
    assert_eq!(shipment.customer_status(), CustomerStatus::OrderPlaced);

    let verified = lifecycle
        .verify_order_at_warehouse(shipment.id, sea_input(), &clerk)
        .await
        .unwrap();
    // 1.5 + 0.2 cbm at the customer's 480 USD/cbm.
    assert_eq!(verified.shipment.cbm, Some(d("1.7")));
    assert_eq!(verified.shipment.final_charge_usd, Some(d("816.00")));
    assert_eq!(
        verified.shipment.pricing_source,
        Some(PricingSource::CustomerOverride)
    );
    assert_eq!(verified.quote.rule_name.as_deref(), Some("contract sea"));
    assert_eq!(verified.shipment.customer_status(), CustomerStatus::Priced);

    let remaining: Vec<ShipmentStatus> = SEA_LADDER
        .iter()
        .copied()
        .skip_while(|s| *s != ShipmentStatus::WarehouseVerifiedPriced)
        .skip(1)
        .collect();
    for target in remaining {
        if target == ShipmentStatus::ReadyForPickup {
            let mut stored = store.load(shipment.id).await.unwrap().unwrap();
            stored.payment_status = PaymentCollectionStatus::PaidInFull;
            store.put(stored);
        }
        lifecycle
            .advance_status(shipment.id, target, &clerk)
            .await
            .unwrap_or_else(|e| panic!("advance to {target}: {e}"));
    }

    let done = store.load(shipment.id).await.unwrap().unwrap();
    assert_eq!(done.status, Some(ShipmentStatus::PickedUpCompleted));
    assert_eq!(done.customer_status(), CustomerStatus::Completed);

    let events = store.events_for(shipment.id);
    assert_eq!(events.len(), 1 + 9);
    assert!(events.iter().all(|e| e.actor_id == clerk));
    assert_eq!(
        events.last().map(|e| e.status),
        Some(ShipmentStatus::PickedUpCompleted)
    );

    let notified: Vec<ShipmentStatus> = notifier.sent().iter().map(|n| n.status).collect();
    assert!(notified.iter().all(|s| s.is_milestone()));
    let expected: Vec<ShipmentStatus> = events
        .iter()
        .map(|e| e.status)
        .filter(|s| s.is_milestone())
        .collect();
    assert_eq!(notified, expected);
}

#[tokio::test]
async fn other_customers_get_the_default_rule() {
    let store = MemoryShipmentStore::new();
    let lifecycle = Lifecycle::new(
        Arc::new(store.clone()),
        Arc::new(StaticRateTables::new(rate_table(CustomerId::new()))),
        Arc::new(RecordingNotifier::new()),
    );
    let shipment = Shipment::new("FL-SEA-2", CustomerId::new());
    store.create(&shipment).await.unwrap();

    let verified = lifecycle
        .verify_order_at_warehouse(shipment.id, sea_input(), &ActorId::new("clerk-2"))
        .await
        .unwrap();
    assert_eq!(verified.shipment.final_charge_usd, Some(d("884.00")));
    assert_eq!(
        verified.shipment.pricing_source,
        Some(PricingSource::DefaultRate)
    );
}

#[tokio::test]
async fn manual_charge_keeps_computed_amount() {
    let store = MemoryShipmentStore::new();
    let lifecycle = Lifecycle::new(
        Arc::new(store.clone()),
        Arc::new(StaticRateTables::new(RateTable::default())),
        Arc::new(RecordingNotifier::new()),
    );
    let shipment = Shipment::new("FL-AIR-3", CustomerId::new());
    store.create(&shipment).await.unwrap();

    let verified = lifecycle
        .verify_order_at_warehouse(
            shipment.id,
            VerificationInput {
                transport_mode: Some(TransportMode::Air),
                packages: vec![RawPackage {
                    weight_kg: Some(d("110.5")),
                    ..Default::default()
                }],
                manual_charge_usd: Some(d("1200")),
                price_adjustment_reason: Some("loyalty discount".into()),
            },
            &ActorId::new("supervisor"),
        )
        .await
        .unwrap();

    let s = &verified.shipment;
    assert_eq!(s.calculated_charge_usd, Some(d("1270.75")));
    assert_eq!(s.final_charge_usd, Some(d("1200.00")));
    assert_eq!(s.pricing_source, Some(PricingSource::ManualAdjustment));
    assert_eq!(s.price_adjustment_reason.as_deref(), Some("loyalty discount"));
}

#[tokio::test]
async fn stale_writer_loses() {
    let store = MemoryShipmentStore::new();
    let lifecycle = Lifecycle::new(
        Arc::new(store.clone()),
        Arc::new(StaticRateTables::new(RateTable::default())),
        Arc::new(RecordingNotifier::new()),
    );
    let shipment = Shipment::new("FL-RACE", CustomerId::new());
    store.create(&shipment).await.unwrap();
    let actor = ActorId::new("ops");

    lifecycle
        .advance_status(shipment.id, ShipmentStatus::AwaitingWarehouseReceipt, &actor)
        .await
        .unwrap();

    // A second writer that read the shipment before that change.
    let now = freight_core::Timestamp::now();
    let stale = StatusCommit {
        shipment_id: shipment.id,
        expected_version: shipment.version,
        new_status: ShipmentStatus::Cancelled,
        resume_from: Some(ShipmentStatus::Submitted),
        updated_at: now,
        event: StatusEvent::new(shipment.id, ShipmentStatus::Cancelled, actor.clone(), now),
    };
    let err = store.commit_status(stale).await.unwrap_err();
    assert!(matches!(err, StoreError::Conflict { .. }));

    let stored = store.load(shipment.id).await.unwrap().unwrap();
    assert_eq!(stored.status, Some(ShipmentStatus::AwaitingWarehouseReceipt));
    assert_eq!(store.events_for(shipment.id).len(), 1);
}

#[tokio::test]
async fn concurrent_advances_commit_once() {
    let store = MemoryShipmentStore::new();
    let lifecycle = Lifecycle::new(
        Arc::new(store.clone()),
        Arc::new(StaticRateTables::new(RateTable::default())),
        Arc::new(RecordingNotifier::new()),
    );
    let shipment = Shipment::new("FL-RACE-2", CustomerId::new());
    store.create(&shipment).await.unwrap();

    let mut handles = Vec::new();
    for n in 0..8 {
        let lifecycle = lifecycle.clone();
        handles.push(tokio::spawn(async move {
            lifecycle
                .advance_status(
                    shipment.id,
                    ShipmentStatus::AwaitingWarehouseReceipt,
                    &ActorId::new(format!("worker-{n}")),
                )
                .await
        }));
    }

    let mut ok = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => ok += 1,
            Err(e) => assert!(
                matches!(e.kind(), ErrorKind::Conflict | ErrorKind::TransitionNotAllowed),
                "{e}"
            ),
        }
    }
    assert_eq!(ok, 1);
    assert_eq!(store.events_for(shipment.id).len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_reverifications_commit_once() {
    let store = MemoryShipmentStore::new();
    let lifecycle = Lifecycle::new(
        Arc::new(store.clone()),
        Arc::new(StaticRateTables::new(RateTable::default())),
        Arc::new(RecordingNotifier::new()),
    );
    let shipment = Shipment::new("FL-RACE-3", CustomerId::new());
    store.create(&shipment).await.unwrap();
    lifecycle
        .verify_order_at_warehouse(shipment.id, sea_input(), &ActorId::new("clerk-0"))
        .await
        .unwrap();
    let events = store.events_for(shipment.id).len();

    let mut handles = Vec::new();
    for n in 0..8 {
        let lifecycle = lifecycle.clone();
        handles.push(tokio::spawn(async move {
            lifecycle
                .verify_order_at_warehouse(
                    shipment.id,
                    sea_input(),
                    &ActorId::new(format!("clerk-{n}")),
                )
                .await
        }));
    }

    let mut ok = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => ok += 1,
            Err(e) => assert_eq!(e.kind(), ErrorKind::Conflict, "{e}"),
        }
    }
    // Whatever the interleaving, the version rises by exactly one per commit.
    let stored = store.load(shipment.id).await.unwrap().unwrap();
    assert!(ok >= 1);
    assert_eq!(stored.version, 1 + ok);
    assert_eq!(store.events_for(shipment.id).len(), events + ok as usize);
}

#[tokio::test]
async fn storage_outage_is_a_persistence_failure() {
    let store = MemoryShipmentStore::new();
    let lifecycle = Lifecycle::new(
        Arc::new(store.clone()),
        Arc::new(StaticRateTables::new(RateTable::default())),
        Arc::new(RecordingNotifier::new()),
    );
    let shipment = Shipment::new("FL-DOWN", CustomerId::new());
    store.create(&shipment).await.unwrap();
    store.set_unavailable(true);

    let err = lifecycle
        .advance_status(shipment.id, ShipmentStatus::AwaitingWarehouseReceipt, &ActorId::new("ops"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PersistenceFailure);
    assert_eq!(err.status_code(), 500);

    store.set_unavailable(false);
    let stored = store.load(shipment.id).await.unwrap().unwrap();
    assert_eq!(stored, shipment);
}

#[test]
fn verification_input_from_json() {
    let input: VerificationInput = serde_json::from_str(
        r#"{
            "transport_mode": "SEA",
            "packages": [{"quantity": 2, "cbm": "0.75", "is_restricted": true,
                          "restricted_override_approved": true,
                          "restricted_override_reason": "permit 42"}]
        }"#,
    )
    .unwrap();
    assert_eq!(input.transport_mode, Some(TransportMode::Sea));
    let pkg = input.packages[0].validate(0).unwrap();
    assert_eq!(pkg.quantity, 2);
    assert!(pkg.restricted_override_approved);
}
