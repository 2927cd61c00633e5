//! # Invoice Totals Engine
//!
//! Aggregates line items into an itemized breakdown and applies the optional
//! credit-card surcharge.
//!
//! ## Computation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Totals Computation                                │
//! │                                                                         │
//! │  line items ──► validate each ──► sum per fee category                 │
//! │                                        │                                │
//! │       items_subtotal = Σ unit_price × qty                              │
//! │       tax            = Σ tax_cents (stored at write time)              │
//! │       pickup         = Σ pickup_fee_cents                              │
//! │       shipping       = Σ shipping_fee_cents                            │
//! │       custom         = Σ custom_fee_cents                              │
//! │                                        │                                │
//! │                                        ▼                                │
//! │       subtotal_before_cc = items + tax + pickup + shipping + custom    │
//! │                                        │                                │
//! │                                        ▼                                │
//! │       cc_fee = enabled ? (manual ?? subtotal × rate) : 0               │
//! │                                        │                                │
//! │                                        ▼                                │
//! │       total = subtotal_before_cc + cc_fee                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Recompute Wins
//! The invoice row caches this output in denormalized columns, but the cache
//! is never trusted: every mutation path recomputes from the FULL current
//! line-item set and rewrites the cache in the same transaction. The
//! computation is idempotent, so re-running it is always safe.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{FeeRate, InvoiceLineItem};
use crate::validation::{validate_cents, validate_name, validate_quantity, validate_rate_bps};
use crate::MAX_INVOICE_LINES;

// =============================================================================
// Credit-Card Surcharge Settings
// =============================================================================

/// The three controls for the optional card surcharge.
///
/// ## Semantics
/// - `enabled = false` forces the fee to zero. The rate and manual amount
///   are RETAINED, not cleared, so re-enabling restores prior settings.
/// - While enabled, a manual amount always wins over the rate-derived value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CcFeeSettings {
    pub enabled: bool,
    pub rate: FeeRate,
    pub manual_amount: Option<Money>,
}

impl CcFeeSettings {
    /// A disabled surcharge with the given stored rate.
    pub const fn disabled(rate: FeeRate) -> Self {
        CcFeeSettings {
            enabled: false,
            rate,
            manual_amount: None,
        }
    }

    /// The fee actually charged on a given pre-surcharge subtotal.
    pub fn fee_for(&self, subtotal_before_cc: Money) -> Money {
        if !self.enabled {
            return Money::zero();
        }

        match self.manual_amount {
            Some(manual) => manual,
            None => subtotal_before_cc.apply_rate(self.rate),
        }
    }
}

// =============================================================================
// Totals Breakdown
// =============================================================================

/// Itemized totals for an invoice.
///
/// Exposed as a breakdown, not just a grand total, because the invoice
/// printout renders each fee category on its own line when non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TotalsBreakdown {
    /// Σ unit_price × quantity across line items.
    pub items_subtotal: Money,
    /// Σ stored line-item tax.
    pub tax: Money,
    /// Σ pickup fees.
    pub pickup: Money,
    /// Σ shipping fees.
    pub shipping: Money,
    /// Σ custom fees.
    pub custom: Money,
    /// The card surcharge actually applied (zero when disabled).
    pub cc_fee: Money,
    /// Grand total: everything above summed.
    pub total: Money,
}

impl TotalsBreakdown {
    /// Empty breakdown (an invoice with no line items).
    pub fn empty() -> Self {
        TotalsBreakdown {
            items_subtotal: Money::zero(),
            tax: Money::zero(),
            pickup: Money::zero(),
            shipping: Money::zero(),
            custom: Money::zero(),
            cc_fee: Money::zero(),
            total: Money::zero(),
        }
    }

    /// The subtotal the surcharge was computed against.
    #[inline]
    pub fn subtotal_before_cc(&self) -> Money {
        self.total - self.cc_fee
    }
}

// =============================================================================
// Line-Item Validation
// =============================================================================

/// Validates one line item at the aggregation boundary.
///
/// Negative quantities, prices, or fees are rejected here so they can never
/// flow into a persisted total.
pub fn validate_line_item(item: &InvoiceLineItem) -> CoreResult<()> {
    validate_name("line item name", &item.name)?;
    validate_quantity(item.quantity)?;
    validate_cents("unit_price", item.unit_price_cents)?;
    validate_cents("tax", item.tax_cents)?;
    validate_cents("pickup_fee", item.pickup_fee_cents)?;
    validate_cents("shipping_fee", item.shipping_fee_cents)?;
    validate_cents("custom_fee", item.custom_fee_cents)?;
    Ok(())
}

// =============================================================================
// Aggregation
// =============================================================================

/// Computes the full totals breakdown for an invoice.
///
/// ## Properties
/// - Pure and deterministic: same inputs, same breakdown.
/// - Idempotent: derived from the full line-item set, never incremental,
///   so re-running after any mutation produces the same answer.
/// - `Σ line_total(item) == subtotal_before_cc` by construction.
///
/// ## Errors
/// - [`CoreError::Validation`] when any item carries a negative amount or a
///   non-positive quantity, or the surcharge rate is out of range.
/// - [`CoreError::TooManyLineItems`] past [`MAX_INVOICE_LINES`].
pub fn compute_totals(
    items: &[InvoiceLineItem],
    cc: &CcFeeSettings,
) -> CoreResult<TotalsBreakdown> {
    if items.len() > MAX_INVOICE_LINES {
        return Err(CoreError::TooManyLineItems {
            max: MAX_INVOICE_LINES,
        });
    }

    validate_rate_bps("cc_fee_rate", cc.rate.bps())?;
    if let Some(manual) = cc.manual_amount {
        validate_cents("cc_fee_manual_amount", manual.cents())
            .map_err(CoreError::Validation)?;
    }

    let mut items_subtotal = Money::zero();
    let mut tax = Money::zero();
    let mut pickup = Money::zero();
    let mut shipping = Money::zero();
    let mut custom = Money::zero();

    for item in items {
        validate_line_item(item)?;

        items_subtotal += Money::from_cents(item.items_subtotal_cents());
        tax += Money::from_cents(item.tax_cents);
        pickup += Money::from_cents(item.pickup_fee_cents);
        shipping += Money::from_cents(item.shipping_fee_cents);
        custom += Money::from_cents(item.custom_fee_cents);
    }

    let subtotal_before_cc = items_subtotal + tax + pickup + shipping + custom;
    let cc_fee = cc.fee_for(subtotal_before_cc);

    Ok(TotalsBreakdown {
        items_subtotal,
        tax,
        pickup,
        shipping,
        custom,
        cc_fee,
        total: subtotal_before_cc + cc_fee,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
