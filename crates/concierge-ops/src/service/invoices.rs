//! # Invoice Workflows
//!
//! Everything the invoice editor does: drafting (manual or generated from a
//! request), line-item editing, the card-surcharge controls, sending,
//! payment, cancellation, and refunds.
//!
//! ## Generated Invoices
//! ```text
//! Request (found) ──► billable items (found | substituted)
//!                          │
//!                          ▼
//!        one line item each: unit price = in-park price,
//!        tax = auto_tax(qty, price), pickup = category default
//!                          │
//!                          ▼
//!        draft invoice + request moved found → invoiced, atomically
//! ```
//!
//! Tax on a line item is re-derived on EVERY edit of quantity or unit price;
//! the frontend shows it as a read-only derived column.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use concierge_core::money::{auto_tax, pickup_fee, Money};
use concierge_core::totals::compute_totals;
use concierge_core::{
    CoreError, FeeRate, Invoice, InvoiceLineItem, InvoiceStatus, PaymentMethod, TotalsBreakdown,
};
use concierge_db::repository::invoice::{generate_line_item_id, new_invoice};

use crate::error::OpsError;
use crate::service::ConciergeService;

/// Input for a manually entered line item.
///
/// Tax is not an input: it is derived from quantity and unit price at the
/// configured rate and stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemInput {
    pub name: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub pickup_fee_cents: i64,
    pub shipping_fee_cents: i64,
    pub custom_fee_label: Option<String>,
    pub custom_fee_cents: i64,
}

/// An invoice with its line items and itemized totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDetail {
    pub invoice: Invoice,
    pub line_items: Vec<InvoiceLineItem>,
    /// Recomputed live from the line items ("recompute wins"); always
    /// matches the cached columns after a committed write.
    pub totals: TotalsBreakdown,
}

impl ConciergeService {
    // =========================================================================
    // Creation
    // =========================================================================

    /// Creates an empty manual draft invoice for a customer.
    pub async fn create_invoice(
        &self,
        customer_id: &str,
        notes: Option<String>,
    ) -> Result<InvoiceDetail, OpsError> {
        self.get_customer(customer_id).await?;

        let mut invoice = new_invoice(customer_id, None, self.config().cc_fee_rate_bps);
        invoice.notes = notes;

        self.db().invoices().create(&invoice).await?;

        info!(id = %invoice.id, customer_id = %customer_id, "Draft invoice created");
        self.get_invoice(&invoice.id).await
    }

    /// Generates a draft invoice from a request's billable items and moves
    /// the request `found → invoiced` in the same transaction.
    ///
    /// Exactly the `found` and `substituted` items are billed; `not_found`
    /// and `pending` items are left off the invoice.
    pub async fn create_invoice_from_request(
        &self,
        request_id: &str,
    ) -> Result<InvoiceDetail, OpsError> {
        let detail = self.get_request(request_id).await?;

        let billable: Vec<_> = detail.items.iter().filter(|i| i.is_billable()).collect();
        if billable.is_empty() {
            return Err(CoreError::NothingToBill {
                request_id: request_id.to_string(),
            }
            .into());
        }

        let invoice = new_invoice(
            &detail.request.customer_id,
            Some(request_id.to_string()),
            self.config().cc_fee_rate_bps,
        );

        let tax_rate = FeeRate::from_bps(self.config().tax_rate_bps);
        let now = Utc::now();

        let mut lines = Vec::with_capacity(billable.len());
        for item in billable {
            let unit_price = item.found_price().ok_or_else(|| {
                OpsError::from(CoreError::MissingItemPrice {
                    item: item.name.clone(),
                })
            })?;

            let line_subtotal = unit_price.multiply_quantity(item.quantity);

            lines.push(InvoiceLineItem {
                id: generate_line_item_id(),
                invoice_id: invoice.id.clone(),
                name: item.name.clone(),
                quantity: item.quantity,
                unit_price_cents: unit_price.cents(),
                tax_cents: auto_tax(item.quantity, unit_price, tax_rate).cents(),
                pickup_fee_cents: pickup_fee(item.category, line_subtotal).cents(),
                shipping_fee_cents: 0,
                custom_fee_label: None,
                custom_fee_cents: 0,
                created_at: now,
            });
        }

        let created = self
            .db()
            .invoices()
            .create_from_request(&invoice, &lines)
            .await?;

        info!(id = %created.id, request_id = %request_id, lines = lines.len(),
              total = created.total_cents, "Invoice generated from request");
        self.get_invoice(&created.id).await
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Gets an invoice with line items and live-recomputed totals.
    pub async fn get_invoice(&self, id: &str) -> Result<InvoiceDetail, OpsError> {
        let invoice = self
            .db()
            .invoices()
            .get_by_id(id)
            .await?
            .ok_or_else(|| OpsError::not_found("Invoice", id))?;

        let line_items = self.db().invoices().get_line_items(id).await?;
        let totals = compute_totals(&line_items, &invoice.cc_fee_settings())
            .map_err(OpsError::from)?;

        Ok(InvoiceDetail {
            invoice,
            line_items,
            totals,
        })
    }

    /// Lists invoices in a given status, newest first.
    pub async fn list_invoices(
        &self,
        status: InvoiceStatus,
        limit: u32,
    ) -> Result<Vec<Invoice>, OpsError> {
        Ok(self.db().invoices().list_by_status(status, limit).await?)
    }

    // =========================================================================
    // Line-Item Editing (draft only, enforced by the repository)
    // =========================================================================

    /// Adds a line item to a draft invoice.
    pub async fn add_line_item(
        &self,
        invoice_id: &str,
        input: LineItemInput,
    ) -> Result<InvoiceDetail, OpsError> {
        let item = self.build_line_item(invoice_id, None, input);
        self.db().invoices().add_line_item(invoice_id, &item).await?;
        self.get_invoice(invoice_id).await
    }

    /// Edits a line item on a draft invoice. Tax is re-derived from the new
    /// quantity and unit price.
    pub async fn update_line_item(
        &self,
        invoice_id: &str,
        line_item_id: &str,
        input: LineItemInput,
    ) -> Result<InvoiceDetail, OpsError> {
        // Keep the row's identity and position; replace its content
        let existing = self
            .db()
            .invoices()
            .get_line_items(invoice_id)
            .await?
            .into_iter()
            .find(|i| i.id == line_item_id)
            .ok_or_else(|| OpsError::not_found("Line item", line_item_id))?;

        let item = self.build_line_item(invoice_id, Some(existing), input);
        self.db()
            .invoices()
            .update_line_item(invoice_id, &item)
            .await?;
        self.get_invoice(invoice_id).await
    }

    /// Removes a line item from a draft invoice.
    pub async fn remove_line_item(
        &self,
        invoice_id: &str,
        line_item_id: &str,
    ) -> Result<InvoiceDetail, OpsError> {
        self.db()
            .invoices()
            .remove_line_item(invoice_id, line_item_id)
            .await?;
        self.get_invoice(invoice_id).await
    }

    /// Updates the card-surcharge controls on a draft invoice.
    pub async fn update_cc_fee(
        &self,
        invoice_id: &str,
        enabled: bool,
        rate_bps: u32,
        manual_cents: Option<i64>,
    ) -> Result<InvoiceDetail, OpsError> {
        self.db()
            .invoices()
            .update_cc_fee(invoice_id, enabled, rate_bps, manual_cents)
            .await?;
        self.get_invoice(invoice_id).await
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// `draft → sent`: stamps `sent_at`. Delivering the invoice (email,
    /// payment link) is the notification provider's job.
    pub async fn send_invoice(&self, invoice_id: &str) -> Result<InvoiceDetail, OpsError> {
        self.db().invoices().mark_sent(invoice_id).await?;
        info!(id = %invoice_id, "Invoice sent");
        self.get_invoice(invoice_id).await
    }

    /// `sent → paid`: records method and reference, stamps `paid_at`, and
    /// cascades the linked request to `paid`.
    pub async fn record_payment(
        &self,
        invoice_id: &str,
        method: PaymentMethod,
        reference: Option<String>,
    ) -> Result<InvoiceDetail, OpsError> {
        self.db()
            .invoices()
            .record_payment(invoice_id, method, reference)
            .await?;
        info!(id = %invoice_id, method = ?method, "Payment recorded");
        self.get_invoice(invoice_id).await
    }

    /// `draft | sent → cancelled`.
    pub async fn cancel_invoice(&self, invoice_id: &str) -> Result<InvoiceDetail, OpsError> {
        self.db().invoices().cancel(invoice_id).await?;
        info!(id = %invoice_id, "Invoice cancelled");
        self.get_invoice(invoice_id).await
    }

    /// `paid → refunded`.
    pub async fn refund_invoice(&self, invoice_id: &str) -> Result<InvoiceDetail, OpsError> {
        self.db().invoices().refund(invoice_id).await?;
        info!(id = %invoice_id, "Invoice refunded");
        self.get_invoice(invoice_id).await
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn build_line_item(
        &self,
        invoice_id: &str,
        existing: Option<InvoiceLineItem>,
        input: LineItemInput,
    ) -> InvoiceLineItem {
        let tax_rate = FeeRate::from_bps(self.config().tax_rate_bps);
        let unit_price = Money::from_cents(input.unit_price_cents);

        let (id, created_at) = match existing {
            Some(row) => (row.id, row.created_at),
            None => (generate_line_item_id(), Utc::now()),
        };

        InvoiceLineItem {
            id,
            invoice_id: invoice_id.to_string(),
            name: input.name.trim().to_string(),
            quantity: input.quantity,
            unit_price_cents: input.unit_price_cents,
            tax_cents: auto_tax(input.quantity, unit_price, tax_rate).cents(),
            pickup_fee_cents: input.pickup_fee_cents,
            shipping_fee_cents: input.shipping_fee_cents,
            custom_fee_label: input.custom_fee_label,
            custom_fee_cents: input.custom_fee_cents,
            created_at,
        }
    }
}
