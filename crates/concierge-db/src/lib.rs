//! # concierge-db: Database Layer for Concierge
//!
//! This crate provides database access for the Concierge back office.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Concierge Data Flow                               │
//! │                                                                         │
//! │  Workflow call (record_payment)                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   concierge-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │◄───│ invoice.rs ... │    │  (embedded)  │  │   │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database (WAL mode, foreign keys ON)                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (customer, request,
//!   invoice, shipment)
//!
//! ## Transactions
//!
//! Every multi-step mutation (line-item change plus totals rewrite, status
//! transition plus cascade) runs inside ONE SQLite transaction. Totals are
//! always recomputed from the full current line-item set by
//! [`concierge_core::totals::compute_totals`]; nothing is incrementally
//! adjusted, so a re-run can never drift.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use concierge_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/concierge.db")).await?;
//! let invoice = db.invoices().get_by_id("...").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::DbError;
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::customer::CustomerRepository;
pub use repository::invoice::InvoiceRepository;
pub use repository::request::RequestRepository;
pub use repository::shipment::ShipmentRepository;
