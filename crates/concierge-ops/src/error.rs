//! # Workflow Error Type
//!
//! Unified error type for workflow methods.
//!
//! ## Serialization
//! This is what the frontend receives when an action fails:
//! ```json
//! {
//!   "code": "INVALID_TRANSITION",
//!   "message": "Invoice inv-42 cannot move from draft to paid"
//! }
//! ```
//! The `code` drives programmatic handling (disable a button, show a form
//! error); the `message` is displayed to the operator.

use serde::Serialize;
use thiserror::Error;

use concierge_core::{CoreError, ImportError};
use concierge_db::DbError;

/// Workflow error returned to the frontend.
#[derive(Debug, Clone, Error, Serialize)]
#[serde(rename_all = "camelCase")]
#[error("{message}")]
pub struct OpsError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for workflow responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// Lifecycle rule rejected the action (409)
    InvalidTransition,

    /// Business logic error (422)
    BusinessLogic,

    /// CSV import failed at the header level (400)
    ImportError,

    /// Database operation failed (500)
    DatabaseError,

    /// Internal server error (500)
    Internal,
}

impl OpsError {
    /// Creates a new workflow error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        OpsError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        OpsError::new(ErrorCode::NotFound, format!("{resource} not found: {id}"))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        OpsError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        OpsError::new(ErrorCode::Internal, message)
    }
}

/// Converts core business errors to workflow errors.
impl From<CoreError> for OpsError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::InvalidStatusTransition { .. } | CoreError::InvoiceNotEditable { .. } => {
                ErrorCode::InvalidTransition
            }
            CoreError::Validation(_) => ErrorCode::ValidationError,
            CoreError::MissingItemPrice { .. }
            | CoreError::NothingToBill { .. }
            | CoreError::TooManyLineItems { .. } => ErrorCode::BusinessLogic,
        };
        OpsError::new(code, err.to_string())
    }
}

/// Converts database errors to workflow errors.
impl From<DbError> for OpsError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { .. } => OpsError::new(ErrorCode::NotFound, err.to_string()),
            DbError::UniqueViolation { .. } | DbError::CheckViolation { .. } => {
                OpsError::new(ErrorCode::ValidationError, err.to_string())
            }
            // Business rules rejected inside a repository transaction keep
            // their own code
            DbError::Domain(core) => OpsError::from(core),
            DbError::ConnectionFailed(_)
            | DbError::MigrationFailed(_)
            | DbError::QueryFailed(_)
            | DbError::PoolExhausted
            | DbError::ForeignKeyViolation { .. } => {
                OpsError::new(ErrorCode::DatabaseError, err.to_string())
            }
            DbError::Internal(_) => OpsError::new(ErrorCode::Internal, err.to_string()),
        }
    }
}

/// Converts CSV import errors to workflow errors.
impl From<ImportError> for OpsError {
    fn from(err: ImportError) -> Self {
        OpsError::new(ErrorCode::ImportError, err.to_string())
    }
}
