//! # Error Types
//!
//! Domain-specific error types for concierge-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  concierge-core errors (this file)                                      │
//! │  ├── CoreError        - Business rule violations                        │
//! │  ├── ValidationError  - Input validation failures                       │
//! │  └── ImportError      - CSV import failures                             │
//! │                                                                         │
//! │  concierge-db errors (separate crate)                                   │
//! │  └── DbError          - Database operation failures                     │
//! │                                                                         │
//! │  concierge-ops errors (separate crate)                                  │
//! │  └── OpsError         - What the frontend sees (serialized)             │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → OpsError → Frontend      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (ids, statuses, row numbers)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations or domain logic failures.
/// They should be caught and translated to user-friendly messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Requested lifecycle move is not in the transition table.
    ///
    /// ## When This Occurs
    /// - Recording payment against a draft invoice
    /// - Shipping a request that has not been paid
    /// - Cancelling an already refunded invoice
    #[error("{entity} {id} cannot move from {from} to {to}")]
    InvalidStatusTransition {
        entity: String,
        id: String,
        from: String,
        to: String,
    },

    /// Line-item or fee mutation attempted after the invoice left draft.
    ///
    /// The edit lock is a server-side rule, not a UI convention: the
    /// repository rejects the write regardless of what the client rendered.
    #[error("Invoice {invoice_id} is {status}, line items are locked")]
    InvoiceNotEditable { invoice_id: String, status: String },

    /// A billable request item has no recorded in-park price.
    #[error("Item '{item}' is billable but has no found price")]
    MissingItemPrice { item: String },

    /// Generating an invoice from a request with nothing billable.
    #[error("Request {request_id} has no found or substituted items to bill")]
    NothingToBill { request_id: String },

    /// Invoice has exceeded maximum allowed line items.
    #[error("Invoice cannot have more than {max} line items")]
    TooManyLineItems { max: usize },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., invalid UUID, invalid email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., duplicate email).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Import Error
// =============================================================================

/// Errors raised by the CSV customer import.
///
/// Header-level problems abort the import; row-level problems are collected
/// by the caller (see [`crate::import`]) so one bad row doesn't sink a
/// 500-row file.
#[derive(Debug, Error)]
pub enum ImportError {
    /// No accepted header spelling matched one or more required fields.
    ///
    /// Reported as a typed error rather than silently importing empty
    /// strings for the missing columns.
    #[error("CSV is missing required columns: {}", columns.join(", "))]
    MissingRequiredColumns { columns: Vec<String> },

    /// The file had no header row at all.
    #[error("CSV has no header row")]
    EmptyFile,

    /// Underlying CSV syntax problem (unbalanced quotes, bad UTF-8).
    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
