//! Shipment, package, and status-event persistence.
//!
//! Verification commits delete and re-insert the shipment's packages inside
//! the same transaction that updates the shipment row and appends the
//! status event, so a partial replacement is never visible.
//!
//! Both commits compare-and-swap on `version` and bump it. The verification
//! update writes only the columns verification owns; `payment_status` and
//! the contact details are left as stored.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use freight_core::{
    ActorId, CustomerId, PackageId, PaymentCollectionStatus, ShipmentId, Timestamp,
    TransportMode,
};
use freight_lifecycle::{
    Package, Shipment, ShipmentStore, StatusCommit, StatusEvent, StoreError, VerificationCommit,
};
use freight_pricing::PricingSource;
use freight_state::{CustomerStatus, ShipmentStatus};
use freight_warehouse::NormalizedPackage;

use crate::{decode, store_error};

const SHIPMENT_COLUMNS: &str = "id, tracking_number, sender_id, recipient_contact, transport_mode, \
     status, resume_from, payment_status, weight_kg, cbm, calculated_charge_usd, \
     final_charge_usd, pricing_source, price_adjustment_reason, created_at, updated_at, version";

/// [`ShipmentStore`] backed by PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgShipmentStore {
    pool: PgPool,
}

impl PgShipmentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Status events for a shipment, oldest first.
    pub async fn events_for(&self, id: ShipmentId) -> Result<Vec<StatusEvent>, StoreError> {
        let rows = sqlx::query_as::<_, StatusEventRow>(
            "SELECT id, shipment_id, status, actor_id, created_at
             FROM status_events WHERE shipment_id = $1 ORDER BY created_at ASC",
        )
        .bind(id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        rows.into_iter().map(StatusEventRow::into_record).collect()
    }

    /// Tell a failed compare-and-swap apart from a missing row.
    async fn missing_or_conflict(
        tx: &mut Transaction<'_, Postgres>,
        id: ShipmentId,
        expected_version: i64,
    ) -> StoreError {
        let exists: Result<Option<i32>, sqlx::Error> =
            sqlx::query_scalar("SELECT 1 FROM shipments WHERE id = $1")
                .bind(id.0)
                .fetch_optional(&mut **tx)
                .await;
        match exists {
            Ok(Some(_)) => StoreError::Conflict {
                shipment_id: id,
                expected_version,
            },
            Ok(None) => StoreError::NotFound(id),
            Err(e) => store_error(e),
        }
    }

    async fn append_event(
        tx: &mut Transaction<'_, Postgres>,
        event: &StatusEvent,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO status_events (id, shipment_id, status, actor_id, created_at)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(event.id)
        .bind(event.shipment_id.0)
        .bind(event.status.as_str())
        .bind(event.actor_id.as_str())
        .bind(*event.timestamp.as_datetime())
        .execute(&mut **tx)
        .await
        .map_err(store_error)?;
        Ok(())
    }
}

#[async_trait]
impl ShipmentStore for PgShipmentStore {
    async fn create(&self, shipment: &Shipment) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO shipments (id, tracking_number, sender_id, recipient_contact,
             transport_mode, status, resume_from, customer_status, payment_status, weight_kg,
             cbm, calculated_charge_usd, final_charge_usd, pricing_source,
             price_adjustment_reason, created_at, updated_at, version)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
             $17, $18)",
        )
        .bind(shipment.id.0)
        .bind(&shipment.tracking_number)
        .bind(shipment.sender_id.0)
        .bind(&shipment.recipient_contact)
        .bind(shipment.transport_mode.map(|m| m.as_str()))
        .bind(shipment.status.map(|s| s.as_str()))
        .bind(shipment.resume_from.map(|s| s.as_str()))
        .bind(shipment.customer_status().as_str())
        .bind(shipment.payment_status.as_str())
        .bind(shipment.weight_kg)
        .bind(shipment.cbm)
        .bind(shipment.calculated_charge_usd)
        .bind(shipment.final_charge_usd)
        .bind(shipment.pricing_source.map(|p| p.as_str()))
        .bind(&shipment.price_adjustment_reason)
        .bind(*shipment.created_at.as_datetime())
        .bind(*shipment.updated_at.as_datetime())
        .bind(shipment.version)
        .execute(&self.pool)
        .await
        .map_err(store_error)?;
        Ok(())
    }

    async fn load(&self, id: ShipmentId) -> Result<Option<Shipment>, StoreError> {
        let row = sqlx::query_as::<_, ShipmentRow>(&format!(
            "SELECT {SHIPMENT_COLUMNS} FROM shipments WHERE id = $1"
        ))
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        row.map(ShipmentRow::into_record).transpose()
    }

    async fn load_packages(&self, id: ShipmentId) -> Result<Vec<Package>, StoreError> {
        let rows = sqlx::query_as::<_, PackageRow>(
            "SELECT id, shipment_id, quantity, length_cm, width_cm, height_cm, weight_kg, cbm,
             description, is_restricted, restricted_override_approved,
             restricted_override_reason, created_at
             FROM packages WHERE shipment_id = $1 ORDER BY created_at, id",
        )
        .bind(id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        rows.into_iter().map(PackageRow::into_record).collect()
    }

    async fn commit_verification(
        &self,
        commit: VerificationCommit,
    ) -> Result<Shipment, StoreError> {
        let shipment = &commit.shipment;
        let mut tx = self.pool.begin().await.map_err(store_error)?;

        let row = sqlx::query_as::<_, ShipmentRow>(&format!(
            "UPDATE shipments SET transport_mode = $1, status = $2, resume_from = $3,
             customer_status = $4, weight_kg = $5, cbm = $6, calculated_charge_usd = $7,
             final_charge_usd = $8, pricing_source = $9, price_adjustment_reason = $10,
             updated_at = $11, version = version + 1
             WHERE id = $12 AND version = $13
             RETURNING {SHIPMENT_COLUMNS}"
        ))
        .bind(shipment.transport_mode.map(|m| m.as_str()))
        .bind(shipment.status.map(|s| s.as_str()))
        .bind(shipment.resume_from.map(|s| s.as_str()))
        .bind(shipment.customer_status().as_str())
        .bind(shipment.weight_kg)
        .bind(shipment.cbm)
        .bind(shipment.calculated_charge_usd)
        .bind(shipment.final_charge_usd)
        .bind(shipment.pricing_source.map(|p| p.as_str()))
        .bind(&shipment.price_adjustment_reason)
        .bind(*shipment.updated_at.as_datetime())
        .bind(shipment.id.0)
        .bind(commit.expected_version)
        .fetch_optional(&mut *tx)
        .await
        .map_err(store_error)?;

        let Some(row) = row else {
            return Err(
                Self::missing_or_conflict(&mut tx, shipment.id, commit.expected_version).await,
            );
        };
        let saved = row.into_record()?;

        sqlx::query("DELETE FROM packages WHERE shipment_id = $1")
            .bind(shipment.id.0)
            .execute(&mut *tx)
            .await
            .map_err(store_error)?;

        for package in &commit.packages {
            let d = &package.details;
            let quantity = i32::try_from(d.quantity).map_err(|_| {
                StoreError::Corrupt(format!("packages.quantity out of range: {}", d.quantity))
            })?;
            sqlx::query(
                "INSERT INTO packages (id, shipment_id, quantity, length_cm, width_cm, height_cm,
                 weight_kg, cbm, description, is_restricted, restricted_override_approved,
                 restricted_override_reason, created_at)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
            )
            .bind(package.id.0)
            .bind(package.shipment_id.0)
            .bind(quantity)
            .bind(d.length_cm)
            .bind(d.width_cm)
            .bind(d.height_cm)
            .bind(d.weight_kg)
            .bind(d.cbm)
            .bind(&d.description)
            .bind(d.is_restricted)
            .bind(d.restricted_override_approved)
            .bind(&d.restricted_override_reason)
            .bind(*package.created_at.as_datetime())
            .execute(&mut *tx)
            .await
            .map_err(store_error)?;
        }

        Self::append_event(&mut tx, &commit.event).await?;
        tx.commit().await.map_err(store_error)?;

        Ok(saved)
    }

    async fn commit_status(&self, commit: StatusCommit) -> Result<Shipment, StoreError> {
        let mut tx = self.pool.begin().await.map_err(store_error)?;

        let row = sqlx::query_as::<_, ShipmentRow>(&format!(
            "UPDATE shipments SET status = $1, resume_from = $2, customer_status = $3,
             updated_at = $4, version = version + 1
             WHERE id = $5 AND version = $6
             RETURNING {SHIPMENT_COLUMNS}"
        ))
        .bind(commit.new_status.as_str())
        .bind(commit.resume_from.map(|s| s.as_str()))
        .bind(CustomerStatus::project(Some(commit.new_status)).as_str())
        .bind(*commit.updated_at.as_datetime())
        .bind(commit.shipment_id.0)
        .bind(commit.expected_version)
        .fetch_optional(&mut *tx)
        .await
        .map_err(store_error)?;

        let Some(row) = row else {
            return Err(
                Self::missing_or_conflict(&mut tx, commit.shipment_id, commit.expected_version)
                    .await,
            );
        };
        let shipment = row.into_record()?;

        Self::append_event(&mut tx, &commit.event).await?;
        tx.commit().await.map_err(store_error)?;

        Ok(shipment)
    }
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct ShipmentRow {
    id: Uuid,
    tracking_number: String,
    sender_id: Uuid,
    recipient_contact: Option<String>,
    transport_mode: Option<String>,
    status: Option<String>,
    resume_from: Option<String>,
    payment_status: String,
    weight_kg: Option<Decimal>,
    cbm: Option<Decimal>,
    calculated_charge_usd: Option<Decimal>,
    final_charge_usd: Option<Decimal>,
    pricing_source: Option<String>,
    price_adjustment_reason: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    version: i64,
}

impl ShipmentRow {
    fn into_record(self) -> Result<Shipment, StoreError> {
        Ok(Shipment {
            id: ShipmentId(self.id),
            tracking_number: self.tracking_number,
            sender_id: CustomerId(self.sender_id),
            recipient_contact: self.recipient_contact,
            transport_mode: self
                .transport_mode
                .as_deref()
                .map(|m| decode::<TransportMode, _>("transport_mode", m))
                .transpose()?,
            status: self
                .status
                .as_deref()
                .map(|s| decode::<ShipmentStatus, _>("status", s))
                .transpose()?,
            resume_from: self
                .resume_from
                .as_deref()
                .map(|s| decode::<ShipmentStatus, _>("resume_from", s))
                .transpose()?,
            payment_status: decode::<PaymentCollectionStatus, _>(
                "payment_status",
                &self.payment_status,
            )?,
            weight_kg: self.weight_kg,
            cbm: self.cbm,
            calculated_charge_usd: self.calculated_charge_usd,
            final_charge_usd: self.final_charge_usd,
            pricing_source: self
                .pricing_source
                .as_deref()
                .map(|p| decode::<PricingSource, _>("pricing_source", p))
                .transpose()?,
            price_adjustment_reason: self.price_adjustment_reason,
            created_at: Timestamp::from_utc(self.created_at),
            updated_at: Timestamp::from_utc(self.updated_at),
            version: self.version,
        })
    }
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct PackageRow {
    id: Uuid,
    shipment_id: Uuid,
    quantity: i32,
    length_cm: Option<Decimal>,
    width_cm: Option<Decimal>,
    height_cm: Option<Decimal>,
    weight_kg: Option<Decimal>,
    cbm: Option<Decimal>,
    description: Option<String>,
    is_restricted: bool,
    restricted_override_approved: bool,
    restricted_override_reason: Option<String>,
    created_at: DateTime<Utc>,
}

impl PackageRow {
    fn into_record(self) -> Result<Package, StoreError> {
        let quantity = u32::try_from(self.quantity)
            .map_err(|_| StoreError::Corrupt(format!("packages.quantity: {}", self.quantity)))?;
        Ok(Package {
            id: PackageId(self.id),
            shipment_id: ShipmentId(self.shipment_id),
            details: NormalizedPackage {
                quantity,
                length_cm: self.length_cm,
                width_cm: self.width_cm,
                height_cm: self.height_cm,
                weight_kg: self.weight_kg,
                cbm: self.cbm,
                description: self.description,
                is_restricted: self.is_restricted,
                restricted_override_approved: self.restricted_override_approved,
                restricted_override_reason: self.restricted_override_reason,
            },
            created_at: Timestamp::from_utc(self.created_at),
        })
    }
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct StatusEventRow {
    id: Uuid,
    shipment_id: Uuid,
    status: String,
    actor_id: String,
    created_at: DateTime<Utc>,
}

impl StatusEventRow {
    fn into_record(self) -> Result<StatusEvent, StoreError> {
        Ok(StatusEvent {
            id: self.id,
            shipment_id: ShipmentId(self.shipment_id),
            status: decode::<ShipmentStatus, _>("status", &self.status)?,
            actor_id: ActorId::new(self.actor_id),
            timestamp: Timestamp::from_utc(self.created_at),
        })
    }
}
