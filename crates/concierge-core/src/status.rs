//! # Lifecycle State Machines
//!
//! Status enums and legal-transition tables for invoices and requests.
//!
//! ## The Two Lifecycles
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Invoice:                                                               │
//! │                                                                         │
//! │    draft ──► sent ──► paid ──► refunded                                │
//! │      │         │                                                        │
//! │      └────┬────┘                                                        │
//! │           ▼                                                             │
//! │       cancelled                                                         │
//! │                                                                         │
//! │  Request (linear, with one backward edge):                              │
//! │                                                                         │
//! │    pending → quoted → approved ⇄ scheduled → shopping → found           │
//! │                                                            │            │
//! │              delivered ← shipped ← paid ← invoiced ◄───────┘            │
//! │                                                                         │
//! │  paid is cascaded from the invoice; shipped from shipment creation.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Enforcement
//! Transition checks live here so every layer agrees on legality. The
//! repositories call these checks inside transactions and additionally guard
//! the UPDATE with a `WHERE status = ...` clause; an illegal transition is a
//! typed [`CoreError::InvalidStatusTransition`](crate::error::CoreError)
//! everywhere, never a silent overwrite.

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::CoreError;

// =============================================================================
// Invoice Status
// =============================================================================

/// The status of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    /// Being assembled; line items and fee settings are editable.
    Draft,
    /// Delivered to the customer; awaiting payment.
    Sent,
    /// Payment recorded.
    Paid,
    /// Abandoned or explicitly cancelled.
    Cancelled,
    /// Payment returned after the fact.
    Refunded,
}

impl InvoiceStatus {
    /// Whether moving from `self` to `next` is a legal transition.
    ///
    /// ## Legal Edges
    /// - `draft → sent` (send action, records sent_at)
    /// - `draft → cancelled` (abandoned draft)
    /// - `sent → paid` (payment recorded)
    /// - `sent → cancelled` (explicit cancel)
    /// - `paid → refunded`
    pub fn can_transition_to(self, next: InvoiceStatus) -> bool {
        use InvoiceStatus::*;
        matches!(
            (self, next),
            (Draft, Sent) | (Draft, Cancelled) | (Sent, Paid) | (Sent, Cancelled) | (Paid, Refunded)
        )
    }

    /// Checks a transition, returning a typed error when illegal.
    pub fn check_transition(
        self,
        next: InvoiceStatus,
        invoice_id: &str,
    ) -> Result<(), CoreError> {
        if self.can_transition_to(next) {
            Ok(())
        } else {
            Err(CoreError::InvalidStatusTransition {
                entity: "Invoice".to_string(),
                id: invoice_id.to_string(),
                from: self.to_string(),
                to: next.to_string(),
            })
        }
    }

    /// Line items and fee settings may only change while drafting.
    #[inline]
    pub fn allows_edits(self) -> bool {
        self == InvoiceStatus::Draft
    }
}

impl Default for InvoiceStatus {
    fn default() -> Self {
        InvoiceStatus::Draft
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Sent => "sent",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Cancelled => "cancelled",
            InvoiceStatus::Refunded => "refunded",
        };
        f.write_str(s)
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// How an invoice was paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// PayPal invoice paid online.
    Paypal,
    /// Stripe payment link.
    Stripe,
    /// Anything recorded by hand (Venmo, cash, comp).
    Manual,
}

// =============================================================================
// Request Status
// =============================================================================

/// The status of a shopping request.
///
/// A mostly linear lifecycle; each status carries a position index used for
/// progress-bar rendering (completed = index < current).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    /// Submitted, not yet priced.
    Pending,
    /// Estimate sent to the customer.
    Quoted,
    /// Customer approved the estimate.
    Approved,
    /// Assigned to a shopping trip.
    Scheduled,
    /// Shopper is in the park.
    Shopping,
    /// Shopping done; item prices recorded.
    Found,
    /// Invoice generated.
    Invoiced,
    /// Invoice paid (cascaded from the invoice).
    Paid,
    /// Shipment created.
    Shipped,
    /// Carrier confirmed delivery.
    Delivered,
}

impl RequestStatus {
    /// Position in the lifecycle, for progress rendering.
    pub const fn position(self) -> u8 {
        match self {
            RequestStatus::Pending => 0,
            RequestStatus::Quoted => 1,
            RequestStatus::Approved => 2,
            RequestStatus::Scheduled => 3,
            RequestStatus::Shopping => 4,
            RequestStatus::Found => 5,
            RequestStatus::Invoiced => 6,
            RequestStatus::Paid => 7,
            RequestStatus::Shipped => 8,
            RequestStatus::Delivered => 9,
        }
    }

    /// Whether moving from `self` to `next` is a legal transition.
    ///
    /// ## Legal Edges
    /// - `pending → quoted`
    /// - `pending | quoted → approved` (approval timestamp set by caller)
    /// - `approved → scheduled` and back (`scheduled → approved` on
    ///   unassignment, the one backward edge)
    /// - `scheduled → shopping → found`
    /// - `found → invoiced` (invoice creation)
    /// - `invoiced → paid` (cascaded from the invoice)
    /// - `paid → shipped` (shipment creation)
    /// - `shipped → delivered`
    pub fn can_transition_to(self, next: RequestStatus) -> bool {
        use RequestStatus::*;
        matches!(
            (self, next),
            (Pending, Quoted)
                | (Pending, Approved)
                | (Quoted, Approved)
                | (Approved, Scheduled)
                | (Scheduled, Approved)
                | (Scheduled, Shopping)
                | (Shopping, Found)
                | (Found, Invoiced)
                | (Invoiced, Paid)
                | (Paid, Shipped)
                | (Shipped, Delivered)
        )
    }

    /// Checks a transition, returning a typed error when illegal.
    pub fn check_transition(
        self,
        next: RequestStatus,
        request_id: &str,
    ) -> Result<(), CoreError> {
        if self.can_transition_to(next) {
            Ok(())
        } else {
            Err(CoreError::InvalidStatusTransition {
                entity: "Request".to_string(),
                id: request_id.to_string(),
                from: self.to_string(),
                to: next.to_string(),
            })
        }
    }
}

impl Default for RequestStatus {
    fn default() -> Self {
        RequestStatus::Pending
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Quoted => "quoted",
            RequestStatus::Approved => "approved",
            RequestStatus::Scheduled => "scheduled",
            RequestStatus::Shopping => "shopping",
            RequestStatus::Found => "found",
            RequestStatus::Invoiced => "invoiced",
            RequestStatus::Paid => "paid",
            RequestStatus::Shipped => "shipped",
            RequestStatus::Delivered => "delivered",
        };
        f.write_str(s)
    }
}

// =============================================================================
// Request Item Status
// =============================================================================

/// Per-item outcome on a shopping request.
///
/// Independent of the request-level status and unordered: items flip between
/// these as the shopper works the park.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum RequestItemStatus {
    /// Not yet looked for.
    Pending,
    /// On the shelf, price recorded.
    Found,
    /// Sold out or discontinued.
    NotFound,
    /// A close alternative was bought instead.
    Substituted,
}

impl RequestItemStatus {
    /// Found and substituted items are the ones billed on a generated
    /// invoice.
    #[inline]
    pub const fn is_billable(self) -> bool {
        matches!(
            self,
            RequestItemStatus::Found | RequestItemStatus::Substituted
        )
    }
}

impl Default for RequestItemStatus {
    fn default() -> Self {
        RequestItemStatus::Pending
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invoice_defaults() {
        assert_eq!(InvoiceStatus::default(), InvoiceStatus::Draft);
        assert!(InvoiceStatus::Draft.allows_edits());
        assert!(!InvoiceStatus::Sent.allows_edits());
    }

    #[test]
    fn test_invoice_legal_transitions() {
        use InvoiceStatus::*;
        assert!(Draft.can_transition_to(Sent));
        assert!(Draft.can_transition_to(Cancelled));
        assert!(Sent.can_transition_to(Paid));
        assert!(Sent.can_transition_to(Cancelled));
        assert!(Paid.can_transition_to(Refunded));
    }

    #[test]
    fn test_invoice_illegal_transitions() {
        use InvoiceStatus::*;
        assert!(!Draft.can_transition_to(Paid));
        assert!(!Paid.can_transition_to(Sent));
        assert!(!Cancelled.can_transition_to(Sent));
        assert!(!Refunded.can_transition_to(Paid));
        assert!(!Sent.can_transition_to(Draft));

        let err = Draft.check_transition(Paid, "inv-1").unwrap_err();
        assert!(err.to_string().contains("draft"));
        assert!(err.to_string().contains("paid"));
    }

    #[test]
    fn test_request_positions_are_ordered() {
        use RequestStatus::*;
        let order = [
            Pending, Quoted, Approved, Scheduled, Shopping, Found, Invoiced, Paid, Shipped,
            Delivered,
        ];
        for window in order.windows(2) {
            assert!(window[0].position() < window[1].position());
        }
    }

    #[test]
    fn test_request_forward_transitions() {
        use RequestStatus::*;
        assert!(Pending.can_transition_to(Quoted));
        assert!(Pending.can_transition_to(Approved));
        assert!(Quoted.can_transition_to(Approved));
        assert!(Approved.can_transition_to(Scheduled));
        assert!(Scheduled.can_transition_to(Shopping));
        assert!(Shopping.can_transition_to(Found));
        assert!(Found.can_transition_to(Invoiced));
        assert!(Invoiced.can_transition_to(Paid));
        assert!(Paid.can_transition_to(Shipped));
        assert!(Shipped.can_transition_to(Delivered));
    }

    #[test]
    fn test_request_unassignment_is_the_only_backward_edge() {
        use RequestStatus::*;
        assert!(Scheduled.can_transition_to(Approved));

        assert!(!Quoted.can_transition_to(Pending));
        assert!(!Shopping.can_transition_to(Scheduled));
        assert!(!Invoiced.can_transition_to(Found));
        assert!(!Delivered.can_transition_to(Shipped));
    }

    #[test]
    fn test_request_no_skipping() {
        use RequestStatus::*;
        assert!(!Pending.can_transition_to(Shopping));
        assert!(!Approved.can_transition_to(Found));
        assert!(!Found.can_transition_to(Paid));
    }

    #[test]
    fn test_item_billability() {
        assert!(RequestItemStatus::Found.is_billable());
        assert!(RequestItemStatus::Substituted.is_billable());
        assert!(!RequestItemStatus::Pending.is_billable());
        assert!(!RequestItemStatus::NotFound.is_billable());
    }
}
