//! # Shipment Repository
//!
//! Database operations for outbound shipments.
//!
//! Creating a shipment is what moves a request `paid → shipped`; a carrier
//! delivery confirmation moves it `shipped → delivered`. Both steps are
//! cascaded in the shipment's own transaction so the request can never point
//! at a shipment that was rolled back.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::request::fetch_request;
use concierge_core::validation::validate_cents;
use concierge_core::{CoreError, RequestStatus, Shipment};

const SHIPMENT_COLUMNS: &str = "\
    id, request_id, carrier, tracking_number, label_cost_cents, \
    shipped_at, delivered_at, created_at";

/// Repository for shipment database operations.
#[derive(Debug, Clone)]
pub struct ShipmentRepository {
    pool: SqlitePool,
}

impl ShipmentRepository {
    /// Creates a new ShipmentRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ShipmentRepository { pool }
    }

    /// Inserts a shipment and moves the request `paid → shipped`.
    pub async fn create(&self, shipment: &Shipment) -> DbResult<Shipment> {
        if let Some(cents) = shipment.label_cost_cents {
            validate_cents("label_cost", cents).map_err(CoreError::from)?;
        }

        debug!(id = %shipment.id, request_id = %shipment.request_id,
               tracking = %shipment.tracking_number, "Creating shipment");

        let mut tx = self.pool.begin().await?;

        let request = fetch_request(&mut tx, &shipment.request_id).await?;
        request
            .status
            .check_transition(RequestStatus::Shipped, &shipment.request_id)?;

        sqlx::query(
            r#"
            INSERT INTO shipments (
                id, request_id, carrier, tracking_number, label_cost_cents,
                shipped_at, delivered_at, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&shipment.id)
        .bind(&shipment.request_id)
        .bind(&shipment.carrier)
        .bind(&shipment.tracking_number)
        .bind(shipment.label_cost_cents)
        .bind(shipment.shipped_at)
        .bind(shipment.delivered_at)
        .bind(shipment.created_at)
        .execute(&mut *tx)
        .await?;

        let now = Utc::now();
        sqlx::query(
            "UPDATE requests SET status = ?2, updated_at = ?3 WHERE id = ?1 AND status = ?4",
        )
        .bind(&shipment.request_id)
        .bind(RequestStatus::Shipped)
        .bind(now)
        .bind(request.status)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.get_by_id(&shipment.id).await
    }

    /// Records delivery and moves the request `shipped → delivered`.
    pub async fn mark_delivered(&self, shipment_id: &str) -> DbResult<Shipment> {
        let mut tx = self.pool.begin().await?;

        let shipment = sqlx::query_as::<_, Shipment>(&format!(
            "SELECT {SHIPMENT_COLUMNS} FROM shipments WHERE id = ?1"
        ))
        .bind(shipment_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DbError::not_found("Shipment", shipment_id))?;

        let request = fetch_request(&mut tx, &shipment.request_id).await?;
        request
            .status
            .check_transition(RequestStatus::Delivered, &shipment.request_id)?;

        let now = Utc::now();

        sqlx::query("UPDATE shipments SET delivered_at = ?2 WHERE id = ?1")
            .bind(shipment_id)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "UPDATE requests SET status = ?2, updated_at = ?3 WHERE id = ?1 AND status = ?4",
        )
        .bind(&shipment.request_id)
        .bind(RequestStatus::Delivered)
        .bind(now)
        .bind(request.status)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        debug!(id = %shipment_id, "Shipment delivered");
        self.get_by_id(shipment_id).await
    }

    /// Gets a shipment by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Shipment> {
        sqlx::query_as::<_, Shipment>(&format!(
            "SELECT {SHIPMENT_COLUMNS} FROM shipments WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Shipment", id))
    }

    /// Gets all shipments for a request.
    pub async fn get_by_request(&self, request_id: &str) -> DbResult<Vec<Shipment>> {
        let shipments = sqlx::query_as::<_, Shipment>(&format!(
            "SELECT {SHIPMENT_COLUMNS} FROM shipments WHERE request_id = ?1 ORDER BY created_at"
        ))
        .bind(request_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(shipments)
    }
}

/// Builds a new shipment row.
pub fn new_shipment(
    request_id: &str,
    carrier: &str,
    tracking_number: &str,
    label_cost_cents: Option<i64>,
) -> Shipment {
    let now = Utc::now();
    Shipment {
        id: Uuid::new_v4().to_string(),
        request_id: request_id.to_string(),
        carrier: carrier.to_string(),
        tracking_number: tracking_number.to_string(),
        label_cost_cents,
        shipped_at: now,
        delivered_at: None,
        created_at: now,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::customer::new_customer;
    use crate::repository::request::new_request;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    /// Walks a request to `paid` so a shipment becomes legal.
    async fn paid_request(db: &Database) -> String {
        let customer = new_customer("Alice Park", "alice@example.com");
        db.customers().insert(&customer).await.unwrap();

        let request = new_request(&customer.id, "Epcot pin run", None);
        db.requests().create(&request, &[]).await.unwrap();

        for status in [
            RequestStatus::Quoted,
            RequestStatus::Approved,
            RequestStatus::Scheduled,
            RequestStatus::Shopping,
            RequestStatus::Found,
            RequestStatus::Invoiced,
            RequestStatus::Paid,
        ] {
            db.requests().transition(&request.id, status).await.unwrap();
        }

        request.id
    }

    #[tokio::test]
    async fn test_create_moves_request_to_shipped() {
        let db = test_db().await;
        let request_id = paid_request(&db).await;

        let shipment = new_shipment(&request_id, "USPS", "9400111899223100000000", Some(895));
        let created = db.shipments().create(&shipment).await.unwrap();
        assert_eq!(created.carrier, "USPS");
        assert!(created.delivered_at.is_none());

        let request = db.requests().get_by_id(&request_id).await.unwrap().unwrap();
        assert_eq!(request.status, RequestStatus::Shipped);
    }

    #[tokio::test]
    async fn test_create_rejected_before_payment() {
        let db = test_db().await;

        let customer = new_customer("Bob Ride", "bob@example.com");
        db.customers().insert(&customer).await.unwrap();
        let request = new_request(&customer.id, "Pending request", None);
        db.requests().create(&request, &[]).await.unwrap();

        let shipment = new_shipment(&request.id, "USPS", "9400", None);
        let err = db.shipments().create(&shipment).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::InvalidStatusTransition { .. })
        ));
    }

    #[tokio::test]
    async fn test_deliver_moves_request_to_delivered() {
        let db = test_db().await;
        let request_id = paid_request(&db).await;

        let shipment = new_shipment(&request_id, "UPS", "1Z999AA10123456784", None);
        let created = db.shipments().create(&shipment).await.unwrap();

        let delivered = db.shipments().mark_delivered(&created.id).await.unwrap();
        assert!(delivered.delivered_at.is_some());

        let request = db.requests().get_by_id(&request_id).await.unwrap().unwrap();
        assert_eq!(request.status, RequestStatus::Delivered);

        // Delivering twice is illegal
        let err = db.shipments().mark_delivered(&created.id).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::InvalidStatusTransition { .. })
        ));
    }

    #[tokio::test]
    async fn test_get_by_request() {
        let db = test_db().await;
        let request_id = paid_request(&db).await;

        let shipment = new_shipment(&request_id, "USPS", "9400111899223100000000", None);
        db.shipments().create(&shipment).await.unwrap();

        let list = db.shipments().get_by_request(&request_id).await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].tracking_number, "9400111899223100000000");
    }
}
