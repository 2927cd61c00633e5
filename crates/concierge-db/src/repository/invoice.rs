//! # Invoice Repository
//!
//! Database operations for invoices and their line items.
//!
//! ## Invoice Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Invoice Lifecycle                                 │
//! │                                                                         │
//! │  1. CREATE DRAFT                                                        │
//! │     └── create() → Invoice { status: Draft }                            │
//! │     └── create_from_request() → draft built from billable items,        │
//! │         request moved found → invoiced in the SAME transaction          │
//! │                                                                         │
//! │  2. EDIT (draft only, server-enforced)                                  │
//! │     └── add/update/remove_line_item(), update_cc_fee()                  │
//! │         each one: mutate → reload ALL items → compute_totals →          │
//! │         rewrite the cached breakdown, atomically                        │
//! │                                                                         │
//! │  3. SEND                                                                │
//! │     └── mark_sent() → Sent, stamps sent_at                              │
//! │                                                                         │
//! │  4. PAY                                                                 │
//! │     └── record_payment() → Paid, stamps paid_at, cascades the           │
//! │         linked request invoiced → paid                                  │
//! │                                                                         │
//! │  5. (OPTIONAL) CANCEL / REFUND                                          │
//! │     └── cancel() from Draft or Sent; refund() from Paid                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Why Recompute Inside the Transaction
//! The totals columns on the invoice row are caches. Writing a line item and
//! its totals in separate round trips is how caches go stale, so every
//! mutation here reloads the full item set and rewrites the breakdown before
//! committing. "Recompute wins": the stored numbers are never read back as
//! an input to the next computation.

use chrono::Utc;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::request::fetch_request;
use concierge_core::totals::{compute_totals, validate_line_item, TotalsBreakdown};
use concierge_core::validation::{validate_cents, validate_rate_bps};
use concierge_core::{
    CoreError, Invoice, InvoiceLineItem, InvoiceStatus, PaymentMethod, RequestStatus,
};

const INVOICE_COLUMNS: &str = "\
    id, invoice_number, customer_id, request_id, status, \
    items_subtotal_cents, tax_cents, pickup_cents, shipping_cents, \
    custom_cents, cc_fee_cents, total_cents, \
    cc_fee_enabled, cc_fee_rate_bps, cc_fee_manual_cents, \
    payment_method, payment_reference, notes, due_date, \
    sent_at, paid_at, created_at, updated_at";

const LINE_ITEM_COLUMNS: &str = "\
    id, invoice_id, name, quantity, unit_price_cents, tax_cents, \
    pickup_fee_cents, shipping_fee_cents, custom_fee_label, custom_fee_cents, \
    created_at";

/// Repository for invoice database operations.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    pool: SqlitePool,
}

impl InvoiceRepository {
    /// Creates a new InvoiceRepository.
    pub fn new(pool: SqlitePool) -> Self {
        InvoiceRepository { pool }
    }

    // =========================================================================
    // Creation
    // =========================================================================

    /// Inserts a manually created draft invoice (no line items yet).
    pub async fn create(&self, invoice: &Invoice) -> DbResult<()> {
        debug!(id = %invoice.id, "Creating invoice");

        let mut tx = self.pool.begin().await?;
        insert_invoice(&mut tx, invoice).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Creates a draft invoice from a request's billable items.
    ///
    /// One transaction covers the whole hand-off:
    /// 1. the request must currently be `found` (checked in-tx)
    /// 2. invoice + line items are inserted
    /// 3. totals are computed from the inserted items and cached
    /// 4. the request moves `found → invoiced` and records `invoice_id`
    pub async fn create_from_request(
        &self,
        invoice: &Invoice,
        items: &[InvoiceLineItem],
    ) -> DbResult<Invoice> {
        let request_id = invoice.request_id.as_deref().ok_or_else(|| {
            DbError::Internal("create_from_request requires invoice.request_id".to_string())
        })?;

        debug!(id = %invoice.id, request_id = %request_id, items = items.len(),
               "Creating invoice from request");

        let mut tx = self.pool.begin().await?;

        let request = fetch_request(&mut tx, request_id).await?;
        request
            .status
            .check_transition(RequestStatus::Invoiced, request_id)?;

        insert_invoice(&mut tx, invoice).await?;
        for item in items {
            validate_line_item(item)?;
            insert_line_item(&mut tx, item).await?;
        }

        let stored = fetch_line_items(&mut tx, &invoice.id).await?;
        let totals = compute_totals(&stored, &invoice.cc_fee_settings())?;
        let now = Utc::now();
        store_totals(&mut tx, &invoice.id, &totals, now).await?;

        sqlx::query(
            r#"
            UPDATE requests SET status = ?2, invoice_id = ?3, updated_at = ?4
            WHERE id = ?1 AND status = ?5
            "#,
        )
        .bind(request_id)
        .bind(RequestStatus::Invoiced)
        .bind(&invoice.id)
        .bind(now)
        .bind(request.status)
        .execute(&mut *tx)
        .await?;

        let refreshed = fetch_invoice(&mut tx, &invoice.id).await?;
        tx.commit().await?;

        Ok(refreshed)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Gets an invoice by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Invoice>> {
        let invoice = sqlx::query_as::<_, Invoice>(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(invoice)
    }

    /// Gets all line items for an invoice, in insertion order.
    pub async fn get_line_items(&self, invoice_id: &str) -> DbResult<Vec<InvoiceLineItem>> {
        let items = sqlx::query_as::<_, InvoiceLineItem>(&format!(
            "SELECT {LINE_ITEM_COLUMNS} FROM invoice_line_items \
             WHERE invoice_id = ?1 ORDER BY rowid"
        ))
        .bind(invoice_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Lists invoices with a given status, newest first.
    pub async fn list_by_status(
        &self,
        status: InvoiceStatus,
        limit: u32,
    ) -> DbResult<Vec<Invoice>> {
        let invoices = sqlx::query_as::<_, Invoice>(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices WHERE status = ?1 \
             ORDER BY created_at DESC LIMIT ?2"
        ))
        .bind(status)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(invoices)
    }

    // =========================================================================
    // Line-Item Mutations (draft only)
    // =========================================================================

    /// Adds a line item and rewrites the cached totals atomically.
    pub async fn add_line_item(
        &self,
        invoice_id: &str,
        item: &InvoiceLineItem,
    ) -> DbResult<Invoice> {
        validate_line_item(item)?;

        let mut tx = self.pool.begin().await?;

        let invoice = fetch_invoice(&mut tx, invoice_id).await?;
        ensure_editable(&invoice)?;

        insert_line_item(&mut tx, item).await?;
        let refreshed = recompute_and_store(&mut tx, &invoice).await?;

        tx.commit().await?;

        debug!(invoice_id = %invoice_id, item = %item.name, total = refreshed.total_cents,
               "Line item added");
        Ok(refreshed)
    }

    /// Replaces a line item's mutable fields and rewrites the cached totals.
    ///
    /// The caller supplies the full updated row with tax already re-derived
    /// (tax follows quantity and unit price on every edit).
    pub async fn update_line_item(
        &self,
        invoice_id: &str,
        item: &InvoiceLineItem,
    ) -> DbResult<Invoice> {
        validate_line_item(item)?;

        let mut tx = self.pool.begin().await?;

        let invoice = fetch_invoice(&mut tx, invoice_id).await?;
        ensure_editable(&invoice)?;

        let result = sqlx::query(
            r#"
            UPDATE invoice_line_items SET
                name = ?3,
                quantity = ?4,
                unit_price_cents = ?5,
                tax_cents = ?6,
                pickup_fee_cents = ?7,
                shipping_fee_cents = ?8,
                custom_fee_label = ?9,
                custom_fee_cents = ?10
            WHERE id = ?1 AND invoice_id = ?2
            "#,
        )
        .bind(&item.id)
        .bind(invoice_id)
        .bind(&item.name)
        .bind(item.quantity)
        .bind(item.unit_price_cents)
        .bind(item.tax_cents)
        .bind(item.pickup_fee_cents)
        .bind(item.shipping_fee_cents)
        .bind(&item.custom_fee_label)
        .bind(item.custom_fee_cents)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("InvoiceLineItem", &item.id));
        }

        let refreshed = recompute_and_store(&mut tx, &invoice).await?;
        tx.commit().await?;

        Ok(refreshed)
    }

    /// Deletes a line item and rewrites the cached totals.
    pub async fn remove_line_item(
        &self,
        invoice_id: &str,
        line_item_id: &str,
    ) -> DbResult<Invoice> {
        let mut tx = self.pool.begin().await?;

        let invoice = fetch_invoice(&mut tx, invoice_id).await?;
        ensure_editable(&invoice)?;

        let result = sqlx::query(
            "DELETE FROM invoice_line_items WHERE id = ?1 AND invoice_id = ?2",
        )
        .bind(line_item_id)
        .bind(invoice_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("InvoiceLineItem", line_item_id));
        }

        let refreshed = recompute_and_store(&mut tx, &invoice).await?;
        tx.commit().await?;

        Ok(refreshed)
    }

    /// Updates the card-surcharge settings and rewrites the cached totals.
    ///
    /// Disabling keeps the stored rate and manual amount so re-enabling
    /// restores them.
    pub async fn update_cc_fee(
        &self,
        invoice_id: &str,
        enabled: bool,
        rate_bps: u32,
        manual_cents: Option<i64>,
    ) -> DbResult<Invoice> {
        validate_rate_bps("cc_fee_rate", rate_bps).map_err(CoreError::from)?;
        if let Some(cents) = manual_cents {
            validate_cents("cc_fee_manual_amount", cents).map_err(CoreError::from)?;
        }

        let mut tx = self.pool.begin().await?;

        let invoice = fetch_invoice(&mut tx, invoice_id).await?;
        ensure_editable(&invoice)?;

        sqlx::query(
            r#"
            UPDATE invoices SET
                cc_fee_enabled = ?2,
                cc_fee_rate_bps = ?3,
                cc_fee_manual_cents = ?4,
                updated_at = ?5
            WHERE id = ?1
            "#,
        )
        .bind(invoice_id)
        .bind(enabled)
        .bind(rate_bps)
        .bind(manual_cents)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        // Recompute against the settings just written, not the stale copy
        let updated = fetch_invoice(&mut tx, invoice_id).await?;
        let refreshed = recompute_and_store(&mut tx, &updated).await?;

        tx.commit().await?;

        debug!(invoice_id = %invoice_id, enabled, rate_bps, cc_fee = refreshed.cc_fee_cents,
               "Card fee settings updated");
        Ok(refreshed)
    }

    // =========================================================================
    // Status Transitions
    // =========================================================================

    /// Marks a draft invoice as sent and stamps `sent_at`.
    pub async fn mark_sent(&self, invoice_id: &str) -> DbResult<Invoice> {
        let mut tx = self.pool.begin().await?;

        let invoice = fetch_invoice(&mut tx, invoice_id).await?;
        invoice
            .status
            .check_transition(InvoiceStatus::Sent, invoice_id)?;

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE invoices SET status = ?2, sent_at = ?3, updated_at = ?3
            WHERE id = ?1 AND status = 'draft'
            "#,
        )
        .bind(invoice_id)
        .bind(InvoiceStatus::Sent)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Invoice (draft)", invoice_id));
        }

        let refreshed = fetch_invoice(&mut tx, invoice_id).await?;
        tx.commit().await?;

        debug!(invoice_id = %invoice_id, "Invoice sent");
        Ok(refreshed)
    }

    /// Records payment: `sent → paid`, stamps `paid_at`, stores the method
    /// and reference, and cascades the linked request `invoiced → paid` in
    /// the same transaction.
    pub async fn record_payment(
        &self,
        invoice_id: &str,
        method: PaymentMethod,
        reference: Option<String>,
    ) -> DbResult<Invoice> {
        let mut tx = self.pool.begin().await?;

        let invoice = fetch_invoice(&mut tx, invoice_id).await?;
        invoice
            .status
            .check_transition(InvoiceStatus::Paid, invoice_id)?;

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE invoices SET
                status = ?2,
                payment_method = ?3,
                payment_reference = ?4,
                paid_at = ?5,
                updated_at = ?5
            WHERE id = ?1 AND status = 'sent'
            "#,
        )
        .bind(invoice_id)
        .bind(InvoiceStatus::Paid)
        .bind(method)
        .bind(&reference)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Invoice (sent)", invoice_id));
        }

        if let Some(request_id) = invoice.request_id.as_deref() {
            let request = fetch_request(&mut tx, request_id).await?;
            request
                .status
                .check_transition(RequestStatus::Paid, request_id)?;

            sqlx::query(
                r#"
                UPDATE requests SET status = ?2, updated_at = ?3
                WHERE id = ?1 AND status = ?4
                "#,
            )
            .bind(request_id)
            .bind(RequestStatus::Paid)
            .bind(now)
            .bind(request.status)
            .execute(&mut *tx)
            .await?;
        }

        let refreshed = fetch_invoice(&mut tx, invoice_id).await?;
        tx.commit().await?;

        debug!(invoice_id = %invoice_id, method = ?method, "Payment recorded");
        Ok(refreshed)
    }

    /// Cancels an invoice (from draft or sent).
    ///
    /// Voiding a pending external payment link is the payment provider's
    /// job; this only records the outcome.
    pub async fn cancel(&self, invoice_id: &str) -> DbResult<Invoice> {
        self.transition_simple(invoice_id, InvoiceStatus::Cancelled)
            .await
    }

    /// Marks a paid invoice as refunded.
    pub async fn refund(&self, invoice_id: &str) -> DbResult<Invoice> {
        self.transition_simple(invoice_id, InvoiceStatus::Refunded)
            .await
    }

    async fn transition_simple(
        &self,
        invoice_id: &str,
        next: InvoiceStatus,
    ) -> DbResult<Invoice> {
        let mut tx = self.pool.begin().await?;

        let invoice = fetch_invoice(&mut tx, invoice_id).await?;
        invoice.status.check_transition(next, invoice_id)?;

        let result = sqlx::query(
            "UPDATE invoices SET status = ?2, updated_at = ?3 WHERE id = ?1 AND status = ?4",
        )
        .bind(invoice_id)
        .bind(next)
        .bind(Utc::now())
        .bind(invoice.status)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Invoice", invoice_id));
        }

        let refreshed = fetch_invoice(&mut tx, invoice_id).await?;
        tx.commit().await?;

        debug!(invoice_id = %invoice_id, from = %invoice.status, to = %next,
               "Invoice transitioned");
        Ok(refreshed)
    }
}

// =============================================================================
// Transaction Helpers
// =============================================================================

fn ensure_editable(invoice: &Invoice) -> Result<(), CoreError> {
    if invoice.status.allows_edits() {
        Ok(())
    } else {
        Err(CoreError::InvoiceNotEditable {
            invoice_id: invoice.id.clone(),
            status: invoice.status.to_string(),
        })
    }
}

async fn fetch_invoice(tx: &mut Transaction<'_, Sqlite>, id: &str) -> DbResult<Invoice> {
    sqlx::query_as::<_, Invoice>(&format!(
        "SELECT {INVOICE_COLUMNS} FROM invoices WHERE id = ?1"
    ))
    .bind(id)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or_else(|| DbError::not_found("Invoice", id))
}

async fn fetch_line_items(
    tx: &mut Transaction<'_, Sqlite>,
    invoice_id: &str,
) -> DbResult<Vec<InvoiceLineItem>> {
    let items = sqlx::query_as::<_, InvoiceLineItem>(&format!(
        "SELECT {LINE_ITEM_COLUMNS} FROM invoice_line_items \
         WHERE invoice_id = ?1 ORDER BY rowid"
    ))
    .bind(invoice_id)
    .fetch_all(&mut **tx)
    .await?;

    Ok(items)
}

async fn insert_invoice(tx: &mut Transaction<'_, Sqlite>, invoice: &Invoice) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO invoices (
            id, invoice_number, customer_id, request_id, status,
            items_subtotal_cents, tax_cents, pickup_cents, shipping_cents,
            custom_cents, cc_fee_cents, total_cents,
            cc_fee_enabled, cc_fee_rate_bps, cc_fee_manual_cents,
            payment_method, payment_reference, notes, due_date,
            sent_at, paid_at, created_at, updated_at
        ) VALUES (
            ?1, ?2, ?3, ?4, ?5,
            ?6, ?7, ?8, ?9,
            ?10, ?11, ?12,
            ?13, ?14, ?15,
            ?16, ?17, ?18, ?19,
            ?20, ?21, ?22, ?23
        )
        "#,
    )
    .bind(&invoice.id)
    .bind(&invoice.invoice_number)
    .bind(&invoice.customer_id)
    .bind(&invoice.request_id)
    .bind(invoice.status)
    .bind(invoice.items_subtotal_cents)
    .bind(invoice.tax_cents)
    .bind(invoice.pickup_cents)
    .bind(invoice.shipping_cents)
    .bind(invoice.custom_cents)
    .bind(invoice.cc_fee_cents)
    .bind(invoice.total_cents)
    .bind(invoice.cc_fee_enabled)
    .bind(invoice.cc_fee_rate_bps)
    .bind(invoice.cc_fee_manual_cents)
    .bind(invoice.payment_method)
    .bind(&invoice.payment_reference)
    .bind(&invoice.notes)
    .bind(invoice.due_date)
    .bind(invoice.sent_at)
    .bind(invoice.paid_at)
    .bind(invoice.created_at)
    .bind(invoice.updated_at)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

async fn insert_line_item(
    tx: &mut Transaction<'_, Sqlite>,
    item: &InvoiceLineItem,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO invoice_line_items (
            id, invoice_id, name, quantity, unit_price_cents, tax_cents,
            pickup_fee_cents, shipping_fee_cents, custom_fee_label,
            custom_fee_cents, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        "#,
    )
    .bind(&item.id)
    .bind(&item.invoice_id)
    .bind(&item.name)
    .bind(item.quantity)
    .bind(item.unit_price_cents)
    .bind(item.tax_cents)
    .bind(item.pickup_fee_cents)
    .bind(item.shipping_fee_cents)
    .bind(&item.custom_fee_label)
    .bind(item.custom_fee_cents)
    .bind(item.created_at)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

async fn store_totals(
    tx: &mut Transaction<'_, Sqlite>,
    invoice_id: &str,
    totals: &TotalsBreakdown,
    now: chrono::DateTime<Utc>,
) -> DbResult<()> {
    sqlx::query(
        r#"
        UPDATE invoices SET
            items_subtotal_cents = ?2,
            tax_cents = ?3,
            pickup_cents = ?4,
            shipping_cents = ?5,
            custom_cents = ?6,
            cc_fee_cents = ?7,
            total_cents = ?8,
            updated_at = ?9
        WHERE id = ?1
        "#,
    )
    .bind(invoice_id)
    .bind(totals.items_subtotal.cents())
    .bind(totals.tax.cents())
    .bind(totals.pickup.cents())
    .bind(totals.shipping.cents())
    .bind(totals.custom.cents())
    .bind(totals.cc_fee.cents())
    .bind(totals.total.cents())
    .bind(now)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Reloads the full line-item set, recomputes the breakdown, stores it, and
/// returns the refreshed invoice row. Always derives from the full set;
/// never adjusts the cached numbers incrementally.
async fn recompute_and_store(
    tx: &mut Transaction<'_, Sqlite>,
    invoice: &Invoice,
) -> DbResult<Invoice> {
    let items = fetch_line_items(tx, &invoice.id).await?;
    let totals = compute_totals(&items, &invoice.cc_fee_settings())?;
    store_totals(tx, &invoice.id, &totals, Utc::now()).await?;
    fetch_invoice(tx, &invoice.id).await
}

// =============================================================================
// Row Builders
// =============================================================================

/// Builds a fresh draft invoice row with zeroed totals.
pub fn new_invoice(
    customer_id: &str,
    request_id: Option<String>,
    cc_fee_rate_bps: u32,
) -> Invoice {
    let now = Utc::now();
    Invoice {
        id: Uuid::new_v4().to_string(),
        invoice_number: Some(generate_invoice_number()),
        customer_id: customer_id.to_string(),
        request_id,
        status: InvoiceStatus::Draft,
        items_subtotal_cents: 0,
        tax_cents: 0,
        pickup_cents: 0,
        shipping_cents: 0,
        custom_cents: 0,
        cc_fee_cents: 0,
        total_cents: 0,
        cc_fee_enabled: false,
        cc_fee_rate_bps,
        cc_fee_manual_cents: None,
        payment_method: None,
        payment_reference: None,
        notes: None,
        due_date: None,
        sent_at: None,
        paid_at: None,
        created_at: now,
        updated_at: now,
    }
}

/// Generates an invoice number in format: INV-YYYYMMDD-NNNN
///
/// ## Example
/// `INV-20260806-0421`
fn generate_invoice_number() -> String {
    let now = Utc::now();
    let date_part = now.format("%Y%m%d");

    // For now, use timestamp milliseconds as sequence
    // TODO: replace with a daily counter table once numbers face customers
    let seq = (now.timestamp_millis() % 10000) as u32;

    format!("INV-{}-{:04}", date_part, seq)
}

/// Generates a new line-item ID.
pub fn generate_line_item_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::customer::new_customer;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn draft_invoice(db: &Database) -> Invoice {
        let customer = new_customer("Alice Park", "alice@example.com");
        db.customers().insert(&customer).await.unwrap();

        let invoice = new_invoice(&customer.id, None, 300);
        db.invoices().create(&invoice).await.unwrap();
        invoice
    }

    fn line(invoice_id: &str, name: &str, qty: i64, unit_price: i64, tax: i64) -> InvoiceLineItem {
        InvoiceLineItem {
            id: generate_line_item_id(),
            invoice_id: invoice_id.to_string(),
            name: name.to_string(),
            quantity: qty,
            unit_price_cents: unit_price,
            tax_cents: tax,
            pickup_fee_cents: 500,
            shipping_fee_cents: 0,
            custom_fee_label: None,
            custom_fee_cents: 0,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_add_line_item_rewrites_totals() {
        let db = test_db().await;
        let invoice = draft_invoice(&db).await;

        // 2 × $25.00, tax $3.25, pickup $5.00 → subtotal $58.25
        let item = line(&invoice.id, "Spirit Jersey", 2, 2500, 325);
        let updated = db.invoices().add_line_item(&invoice.id, &item).await.unwrap();

        assert_eq!(updated.items_subtotal_cents, 5000);
        assert_eq!(updated.tax_cents, 325);
        assert_eq!(updated.pickup_cents, 500);
        assert_eq!(updated.cc_fee_cents, 0);
        assert_eq!(updated.total_cents, 5825);
    }

    #[tokio::test]
    async fn test_cc_fee_toggle_and_manual_override() {
        let db = test_db().await;
        let invoice = draft_invoice(&db).await;

        let item = line(&invoice.id, "Spirit Jersey", 2, 2500, 325);
        db.invoices().add_line_item(&invoice.id, &item).await.unwrap();

        // Enable at 3%: $58.25 × 3% = $1.75, total $60.00
        let enabled = db
            .invoices()
            .update_cc_fee(&invoice.id, true, 300, None)
            .await
            .unwrap();
        assert_eq!(enabled.cc_fee_cents, 175);
        assert_eq!(enabled.total_cents, 6000);

        // Manual override wins over the rate
        let manual = db
            .invoices()
            .update_cc_fee(&invoice.id, true, 300, Some(250))
            .await
            .unwrap();
        assert_eq!(manual.cc_fee_cents, 250);
        assert_eq!(manual.total_cents, 6075);

        // Disable: fee zero, but settings retained
        let disabled = db
            .invoices()
            .update_cc_fee(&invoice.id, false, 300, Some(250))
            .await
            .unwrap();
        assert_eq!(disabled.cc_fee_cents, 0);
        assert_eq!(disabled.total_cents, 5825);
        assert_eq!(disabled.cc_fee_manual_cents, Some(250));

        // Re-enable restores the manual amount
        let restored = db
            .invoices()
            .update_cc_fee(&invoice.id, true, 300, disabled.cc_fee_manual_cents)
            .await
            .unwrap();
        assert_eq!(restored.cc_fee_cents, 250);
    }

    #[tokio::test]
    async fn test_remove_line_item_never_leaves_stale_total() {
        let db = test_db().await;
        let invoice = draft_invoice(&db).await;

        let a = line(&invoice.id, "Jersey", 2, 2500, 325);
        let b = line(&invoice.id, "Ears", 1, 3499, 227);
        db.invoices().add_line_item(&invoice.id, &a).await.unwrap();
        let before = db.invoices().add_line_item(&invoice.id, &b).await.unwrap();

        let after = db
            .invoices()
            .remove_line_item(&invoice.id, &b.id)
            .await
            .unwrap();

        assert!(after.total_cents <= before.total_cents);
        assert_eq!(after.total_cents, 5825);

        let items = db.invoices().get_line_items(&invoice.id).await.unwrap();
        assert_eq!(items.len(), 1);
    }

    #[tokio::test]
    async fn test_update_line_item_recomputes() {
        let db = test_db().await;
        let invoice = draft_invoice(&db).await;

        let mut item = line(&invoice.id, "Jersey", 2, 2500, 325);
        db.invoices().add_line_item(&invoice.id, &item).await.unwrap();

        // Quantity change: tax re-derived by the caller (3 × $25.00 × 6.5%)
        item.quantity = 3;
        item.tax_cents = 488;
        let updated = db
            .invoices()
            .update_line_item(&invoice.id, &item)
            .await
            .unwrap();

        assert_eq!(updated.items_subtotal_cents, 7500);
        assert_eq!(updated.tax_cents, 488);
        assert_eq!(updated.total_cents, 7500 + 488 + 500);
    }

    #[tokio::test]
    async fn test_non_draft_edits_rejected_server_side() {
        let db = test_db().await;
        let invoice = draft_invoice(&db).await;

        let item = line(&invoice.id, "Jersey", 2, 2500, 325);
        db.invoices().add_line_item(&invoice.id, &item).await.unwrap();
        db.invoices().mark_sent(&invoice.id).await.unwrap();

        let another = line(&invoice.id, "Ears", 1, 3499, 227);
        let err = db
            .invoices()
            .add_line_item(&invoice.id, &another)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::InvoiceNotEditable { .. })
        ));

        let err = db
            .invoices()
            .update_cc_fee(&invoice.id, true, 300, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::InvoiceNotEditable { .. })
        ));

        let err = db
            .invoices()
            .remove_line_item(&invoice.id, &item.id)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::InvoiceNotEditable { .. })
        ));
    }

    #[tokio::test]
    async fn test_lifecycle_transitions() {
        let db = test_db().await;
        let invoice = draft_invoice(&db).await;

        // Cannot pay a draft
        let err = db
            .invoices()
            .record_payment(&invoice.id, PaymentMethod::Paypal, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::InvalidStatusTransition { .. })
        ));

        let sent = db.invoices().mark_sent(&invoice.id).await.unwrap();
        assert_eq!(sent.status, InvoiceStatus::Sent);
        assert!(sent.sent_at.is_some());

        let paid = db
            .invoices()
            .record_payment(
                &invoice.id,
                PaymentMethod::Paypal,
                Some("PAYID-123".to_string()),
            )
            .await
            .unwrap();
        assert_eq!(paid.status, InvoiceStatus::Paid);
        assert!(paid.paid_at.is_some());
        assert_eq!(paid.payment_method, Some(PaymentMethod::Paypal));
        assert_eq!(paid.payment_reference.as_deref(), Some("PAYID-123"));

        let refunded = db.invoices().refund(&invoice.id).await.unwrap();
        assert_eq!(refunded.status, InvoiceStatus::Refunded);
    }

    #[tokio::test]
    async fn test_cancel_paths() {
        let db = test_db().await;

        let draft = draft_invoice(&db).await;
        let cancelled = db.invoices().cancel(&draft.id).await.unwrap();
        assert_eq!(cancelled.status, InvoiceStatus::Cancelled);

        // Cancelled is terminal
        let err = db.invoices().mark_sent(&draft.id).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::InvalidStatusTransition { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_invoice_cascades_line_items() {
        let db = test_db().await;
        let invoice = draft_invoice(&db).await;

        let item = line(&invoice.id, "Jersey", 2, 2500, 325);
        db.invoices().add_line_item(&invoice.id, &item).await.unwrap();

        sqlx::query("DELETE FROM invoices WHERE id = ?1")
            .bind(&invoice.id)
            .execute(db.pool())
            .await
            .unwrap();

        let orphans: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM invoice_line_items WHERE invoice_id = ?1")
                .bind(&invoice.id)
                .fetch_one(db.pool())
                .await
                .unwrap();
        assert_eq!(orphans, 0);
    }
}
