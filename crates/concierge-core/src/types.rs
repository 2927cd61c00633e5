//! # Domain Types
//!
//! Core domain types used throughout Concierge.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Customer     │   │     Request     │   │     Invoice     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │──►│  id (UUID)      │──►│  id (UUID)      │       │
//! │  │  name, email    │   │  status         │   │  status         │       │
//! │  │  address        │   │  items[]        │   │  line items[]   │       │
//! │  └─────────────────┘   └────────┬────────┘   └────────┬────────┘       │
//! │                                 │                     │                 │
//! │                        ┌────────▼────────┐   ┌────────▼────────┐       │
//! │                        │   RequestItem   │   │ InvoiceLineItem │       │
//! │                        │  found price    │   │  price+fees+tax │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! │                                 │                                       │
//! │                        ┌────────▼────────┐                             │
//! │                        │    Shipment     │  (created once paid)        │
//! │                        └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID where one exists (invoice_number, tracking_number)

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::status::{InvoiceStatus, PaymentMethod, RequestItemStatus, RequestStatus};

// =============================================================================
// Fee Rate
// =============================================================================

/// Percentage rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 650 bps = 6.5% (Florida sales tax), 300 bps = 3.0% (card surcharge)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FeeRate(u32);

impl FeeRate {
    /// Creates a rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        FeeRate(bps)
    }

    /// Creates a rate from a percentage (for convenience).
    pub fn from_percentage(pct: f64) -> Self {
        FeeRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero rate.
    #[inline]
    pub const fn zero() -> Self {
        FeeRate(0)
    }

    /// Checks if the rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for FeeRate {
    fn default() -> Self {
        FeeRate::zero()
    }
}

// =============================================================================
// Item Category
// =============================================================================

/// Merchandise category for a requested item.
///
/// Drives the default pickup fee when the operator has not set one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ItemCategory {
    /// Shirts, hats, jackets.
    Apparel,
    /// Plush characters.
    Plush,
    /// Toys and games.
    Toys,
    /// Pins, figures, limited releases.
    Collectibles,
    /// Packaged snacks and candy.
    Food,
    /// Books, music, art prints.
    Media,
    /// Anything else.
    Other,
}

impl ItemCategory {
    /// Flat pickup fee in cents for this category.
    ///
    /// Bulkier categories cost more runner time to carry out of the park.
    pub const fn pickup_fee_cents(&self) -> i64 {
        match self {
            ItemCategory::Apparel => 500,
            ItemCategory::Plush => 500,
            ItemCategory::Toys => 700,
            ItemCategory::Collectibles => 1000,
            ItemCategory::Food => 300,
            ItemCategory::Media => 400,
            ItemCategory::Other => 500,
        }
    }
}

impl Default for ItemCategory {
    fn default() -> Self {
        ItemCategory::Other
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A customer of the concierge service.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Customer {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Full name.
    pub name: String,

    /// Contact email - unique per customer.
    pub email: String,

    /// Optional phone number.
    pub phone: Option<String>,

    /// Shipping address.
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,

    /// Free-form operator notes.
    pub notes: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Request
// =============================================================================

/// A customer shopping request.
///
/// Travels the linear lifecycle in [`RequestStatus`]; other aggregates
/// (invoices, shipments) read and advance it.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Request {
    pub id: String,
    pub customer_id: String,

    /// Short label shown on the request board ("Epcot pin run").
    pub title: String,

    pub status: RequestStatus,

    /// Free-form notes from the customer or operator.
    pub notes: Option<String>,

    /// Set when the request is approved.
    #[ts(as = "Option<String>")]
    pub approved_at: Option<DateTime<Utc>>,

    /// Set when an invoice is generated from this request.
    pub invoice_id: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Request Item
// =============================================================================

/// A single item on a shopping request.
///
/// Item status is independent of the request-level status and does not
/// follow a strict order. Items marked `found` or `substituted` are the
/// billable ones when an invoice is generated.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct RequestItem {
    pub id: String,
    pub request_id: String,

    /// What the customer asked for.
    pub name: String,

    /// Size, color, edition details.
    pub details: Option<String>,

    pub quantity: i64,

    pub category: ItemCategory,

    pub status: RequestItemStatus,

    /// Customer's guess at the price, used for quoting.
    pub estimated_price_cents: Option<i64>,

    /// Actual shelf price recorded by the shopper in the park.
    /// Required before the item can be billed.
    pub found_price_cents: Option<i64>,

    /// What was substituted and why, when status is `substituted`.
    pub substitution_note: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl RequestItem {
    /// Returns the in-park price as Money, if recorded.
    #[inline]
    pub fn found_price(&self) -> Option<Money> {
        self.found_price_cents.map(Money::from_cents)
    }

    /// Whether this item should appear on a generated invoice.
    #[inline]
    pub fn is_billable(&self) -> bool {
        self.status.is_billable()
    }
}

// =============================================================================
// Invoice
// =============================================================================

/// An invoice issued to a customer.
///
/// The `*_cents` totals columns are denormalized caches of the totals
/// engine's output. The live recomputation from line items is authoritative;
/// every mutation path rewrites the whole breakdown in one transaction.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Invoice {
    pub id: String,

    /// Human-readable number shown to the customer (INV-20260801-0042).
    pub invoice_number: Option<String>,

    pub customer_id: String,

    /// The originating request, when generated rather than manual.
    pub request_id: Option<String>,

    pub status: InvoiceStatus,

    // --- Denormalized totals (cache of TotalsBreakdown) ---
    pub items_subtotal_cents: i64,
    pub tax_cents: i64,
    pub pickup_cents: i64,
    pub shipping_cents: i64,
    pub custom_cents: i64,
    pub cc_fee_cents: i64,
    pub total_cents: i64,

    // --- Card surcharge controls ---
    /// When false the surcharge is zero; stored settings are retained.
    pub cc_fee_enabled: bool,
    /// Surcharge rate in basis points (300 = 3.0%).
    pub cc_fee_rate_bps: u32,
    /// Manual override: always wins over the rate while enabled.
    pub cc_fee_manual_cents: Option<i64>,

    // --- Payment ---
    pub payment_method: Option<PaymentMethod>,
    pub payment_reference: Option<String>,

    pub notes: Option<String>,

    #[ts(as = "Option<String>")]
    pub due_date: Option<NaiveDate>,

    #[ts(as = "Option<String>")]
    pub sent_at: Option<DateTime<Utc>>,

    #[ts(as = "Option<String>")]
    pub paid_at: Option<DateTime<Utc>>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    /// Returns the grand total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Returns the card surcharge settings for the totals engine.
    pub fn cc_fee_settings(&self) -> crate::totals::CcFeeSettings {
        crate::totals::CcFeeSettings {
            enabled: self.cc_fee_enabled,
            rate: FeeRate::from_bps(self.cc_fee_rate_bps),
            manual_amount: self.cc_fee_manual_cents.map(Money::from_cents),
        }
    }
}

// =============================================================================
// Invoice Line Item
// =============================================================================

/// A line item on an invoice.
///
/// Prices are frozen onto the line when it is written; tax is auto-derived
/// and stored at the same moment (see [`crate::money::auto_tax`]).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct InvoiceLineItem {
    pub id: String,
    pub invoice_id: String,

    pub name: String,
    pub quantity: i64,
    pub unit_price_cents: i64,

    /// Auto-derived tax, stored at write time.
    pub tax_cents: i64,

    /// In-park retrieval fee.
    pub pickup_fee_cents: i64,

    /// Per-line shipping charge.
    pub shipping_fee_cents: i64,

    /// Label for the custom fee line, when one applies ("Gift wrap").
    pub custom_fee_label: Option<String>,
    pub custom_fee_cents: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl InvoiceLineItem {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Items portion of the line (unit price × quantity), before fees.
    #[inline]
    pub fn items_subtotal_cents(&self) -> i64 {
        self.unit_price_cents * self.quantity
    }

    /// Full line total:
    /// `unit_price × quantity + tax + pickup + shipping + custom`.
    #[inline]
    pub fn line_total_cents(&self) -> i64 {
        self.items_subtotal_cents()
            + self.tax_cents
            + self.pickup_fee_cents
            + self.shipping_fee_cents
            + self.custom_fee_cents
    }

    /// Full line total as Money.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents())
    }
}

// =============================================================================
// Shipment
// =============================================================================

/// An outbound shipment for a paid request.
///
/// Label purchase and tracking updates happen in an external carrier
/// integration; this record stores what that collaborator hands back.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Shipment {
    pub id: String,
    pub request_id: String,

    pub carrier: String,
    pub tracking_number: String,

    /// What the label cost us, when known.
    pub label_cost_cents: Option<i64>,

    #[ts(as = "String")]
    pub shipped_at: DateTime<Utc>,

    #[ts(as = "Option<String>")]
    pub delivered_at: Option<DateTime<Utc>>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
