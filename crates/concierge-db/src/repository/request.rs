//! # Request Repository
//!
//! Database operations for shopping requests and their items.
//!
//! ## Request Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Request Lifecycle                                  │
//! │                                                                         │
//! │  1. CREATE                                                              │
//! │     └── create() → Request { status: Pending } + items                  │
//! │                                                                         │
//! │  2. QUOTE / APPROVE / SCHEDULE                                          │
//! │     └── transition() walks the state machine; approval stamps           │
//! │         approved_at                                                     │
//! │                                                                         │
//! │  3. SHOP                                                                │
//! │     └── update_item() records found prices and substitutions            │
//! │                                                                         │
//! │  4. INVOICE / PAY / SHIP                                                │
//! │     └── driven by InvoiceRepository and ShipmentRepository, which       │
//! │         cascade the request forward in their own transactions           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every transition is checked against the core state machine INSIDE the
//! transaction, and the UPDATE is additionally guarded by the expected
//! current status, so a concurrent editor cannot sneak a row past the table.

use chrono::Utc;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use concierge_core::validation::validate_cents;
use concierge_core::{CoreError, Request, RequestItem, RequestItemStatus, RequestStatus};

const REQUEST_COLUMNS: &str = "\
    id, customer_id, title, status, notes, approved_at, invoice_id, \
    created_at, updated_at";

const ITEM_COLUMNS: &str = "\
    id, request_id, name, details, quantity, category, status, \
    estimated_price_cents, found_price_cents, substitution_note, \
    created_at, updated_at";

/// Repository for request database operations.
#[derive(Debug, Clone)]
pub struct RequestRepository {
    pool: SqlitePool,
}

impl RequestRepository {
    /// Creates a new RequestRepository.
    pub fn new(pool: SqlitePool) -> Self {
        RequestRepository { pool }
    }

    /// Inserts a request and its items in one transaction.
    pub async fn create(&self, request: &Request, items: &[RequestItem]) -> DbResult<()> {
        debug!(id = %request.id, items = items.len(), "Creating request");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO requests (
                id, customer_id, title, status, notes, approved_at, invoice_id,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&request.id)
        .bind(&request.customer_id)
        .bind(&request.title)
        .bind(request.status)
        .bind(&request.notes)
        .bind(request.approved_at)
        .bind(&request.invoice_id)
        .bind(request.created_at)
        .bind(request.updated_at)
        .execute(&mut *tx)
        .await?;

        for item in items {
            insert_item(&mut tx, item).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Gets a request by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Request>> {
        let request = sqlx::query_as::<_, Request>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM requests WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    /// Gets all items for a request, in insertion order.
    pub async fn get_items(&self, request_id: &str) -> DbResult<Vec<RequestItem>> {
        let items = sqlx::query_as::<_, RequestItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM request_items WHERE request_id = ?1 ORDER BY rowid"
        ))
        .bind(request_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Lists requests with a given status, newest first.
    pub async fn list_by_status(
        &self,
        status: RequestStatus,
        limit: u32,
    ) -> DbResult<Vec<Request>> {
        let requests = sqlx::query_as::<_, Request>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM requests WHERE status = ?1 \
             ORDER BY created_at DESC LIMIT ?2"
        ))
        .bind(status)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }

    /// Moves a request to `next`, enforcing the state machine.
    ///
    /// Approval (`next == Approved` from pending/quoted) stamps
    /// `approved_at`; the unassignment edge (`Scheduled → Approved`) leaves
    /// the original approval timestamp in place.
    pub async fn transition(&self, request_id: &str, next: RequestStatus) -> DbResult<Request> {
        let mut tx = self.pool.begin().await?;

        let request = fetch_request(&mut tx, request_id).await?;
        request.status.check_transition(next, request_id)?;

        let now = Utc::now();
        let stamps_approval = next == RequestStatus::Approved && request.approved_at.is_none();

        let result = sqlx::query(
            r#"
            UPDATE requests SET
                status = ?2,
                approved_at = CASE WHEN ?3 THEN ?4 ELSE approved_at END,
                updated_at = ?4
            WHERE id = ?1 AND status = ?5
            "#,
        )
        .bind(request_id)
        .bind(next)
        .bind(stamps_approval)
        .bind(now)
        .bind(request.status)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Request", request_id));
        }

        tx.commit().await?;

        debug!(id = %request_id, from = %request.status, to = %next, "Request transitioned");
        self.get_by_id(request_id)
            .await?
            .ok_or_else(|| DbError::not_found("Request", request_id))
    }

    /// Records a shopping outcome for one item.
    ///
    /// Billable outcomes (`Found`, `Substituted`) require an in-park price;
    /// rejecting the write here keeps unpriced items from ever reaching an
    /// invoice.
    pub async fn update_item(
        &self,
        item_id: &str,
        status: RequestItemStatus,
        found_price_cents: Option<i64>,
        substitution_note: Option<String>,
    ) -> DbResult<RequestItem> {
        if let Some(cents) = found_price_cents {
            validate_cents("found_price", cents).map_err(CoreError::from)?;
        }

        if status.is_billable() && found_price_cents.is_none() {
            let item = self.get_item(item_id).await?;
            return Err(CoreError::MissingItemPrice { item: item.name }.into());
        }

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE request_items SET
                status = ?2,
                found_price_cents = ?3,
                substitution_note = ?4,
                updated_at = ?5
            WHERE id = ?1
            "#,
        )
        .bind(item_id)
        .bind(status)
        .bind(found_price_cents)
        .bind(&substitution_note)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("RequestItem", item_id));
        }

        self.get_item(item_id).await
    }

    /// Gets one request item by ID.
    pub async fn get_item(&self, item_id: &str) -> DbResult<RequestItem> {
        sqlx::query_as::<_, RequestItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM request_items WHERE id = ?1"
        ))
        .bind(item_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("RequestItem", item_id))
    }
}

/// Inserts one request item within an open transaction.
pub(crate) async fn insert_item(
    tx: &mut Transaction<'_, Sqlite>,
    item: &RequestItem,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO request_items (
            id, request_id, name, details, quantity, category, status,
            estimated_price_cents, found_price_cents, substitution_note,
            created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
        "#,
    )
    .bind(&item.id)
    .bind(&item.request_id)
    .bind(&item.name)
    .bind(&item.details)
    .bind(item.quantity)
    .bind(item.category)
    .bind(item.status)
    .bind(item.estimated_price_cents)
    .bind(item.found_price_cents)
    .bind(&item.substitution_note)
    .bind(item.created_at)
    .bind(item.updated_at)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Fetches a request within an open transaction.
pub(crate) async fn fetch_request(
    tx: &mut Transaction<'_, Sqlite>,
    request_id: &str,
) -> DbResult<Request> {
    sqlx::query_as::<_, Request>(&format!(
        "SELECT {REQUEST_COLUMNS} FROM requests WHERE id = ?1"
    ))
    .bind(request_id)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or_else(|| DbError::not_found("Request", request_id))
}

/// Builds a new pending request row.
pub fn new_request(customer_id: &str, title: &str, notes: Option<String>) -> Request {
    let now = Utc::now();
    Request {
        id: Uuid::new_v4().to_string(),
        customer_id: customer_id.to_string(),
        title: title.to_string(),
        status: RequestStatus::Pending,
        notes,
        approved_at: None,
        invoice_id: None,
        created_at: now,
        updated_at: now,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
