//! # concierge-core: Pure Business Logic for Concierge
//!
//! This crate is the **heart** of Concierge, a back office for a theme-park
//! merchandise concierge service. It contains all business logic as pure
//! functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Concierge Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  Web Frontend (TypeScript)                      │   │
//! │  │   Request board ──► Invoice editor ──► Payments ──► Shipping   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    concierge-ops (workflows)                    │   │
//! │  │    create_invoice_from_request, record_payment, import_csv      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ concierge-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────────────┐  │   │
//! │  │   │  types   │ │  money   │ │  totals  │ │ status / import  │  │   │
//! │  │   │ Invoice  │ │  Money   │ │ Breakdown│ │  state machines  │  │   │
//! │  │   │ Request  │ │ FeeRate  │ │  CC fee  │ │  header aliases  │  │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  concierge-db (Database Layer)                  │   │
//! │  │            SQLite queries, migrations, repositories             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Customer, Request, Invoice, Shipment, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`totals`] - Invoice totals engine (fee aggregation, card surcharge)
//! - [`status`] - Invoice and request lifecycle state machines
//! - [`import`] - CSV header alias mapping for customer import
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use concierge_core::money::{auto_tax, Money};
//! use concierge_core::types::FeeRate;
//! use concierge_core::FLORIDA_TAX_BPS;
//!
//! // Create money from cents (never from floats!)
//! let unit_price = Money::from_cents(7999); // $79.99
//!
//! // Tax is computed once, at line-item write time, and stored
//! let tax = auto_tax(2, unit_price, FeeRate::from_bps(FLORIDA_TAX_BPS));
//!
//! // 2 × $79.99 × 6.5% = $10.3987 → $10.40
//! assert_eq!(tax.cents(), 1040);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod import;
pub mod money;
pub mod status;
pub mod totals;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use concierge_core::Money` instead of
// `use concierge_core::money::Money`

pub use error::{CoreError, ImportError, ValidationError};
pub use money::Money;
pub use status::{InvoiceStatus, PaymentMethod, RequestItemStatus, RequestStatus};
pub use totals::{CcFeeSettings, TotalsBreakdown};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Florida sales tax in basis points (6.5%).
///
/// ## Why a constant?
/// All in-park purchases happen in one jurisdiction. The rate is applied at
/// line-item write time and the resulting amount is STORED, so invoices
/// issued before a rate change keep their historical tax amounts.
pub const FLORIDA_TAX_BPS: u32 = 650;

/// Default credit-card surcharge in basis points (3.0%).
///
/// Operators can override the rate per invoice, or replace the computed
/// amount with a manual figure.
pub const DEFAULT_CC_FEE_BPS: u32 = 300;

/// Maximum line items allowed on a single invoice
///
/// ## Business Reason
/// Prevents runaway invoices and keeps printouts to a reasonable size.
pub const MAX_INVOICE_LINES: usize = 100;

/// Maximum quantity of a single line item
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10)
pub const MAX_ITEM_QUANTITY: i64 = 999;
