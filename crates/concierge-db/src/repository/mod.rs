//! # Repository Module
//!
//! Database repository implementations for Concierge.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  Workflow call                                                          │
//! │       │                                                                 │
//! │       │  db.invoices().record_payment(id, method, reference)            │
//! │       ▼                                                                 │
//! │  InvoiceRepository                                                      │
//! │  ├── loads the row inside a transaction                                 │
//! │  ├── checks the transition against the core state machine               │
//! │  ├── applies the guarded UPDATE (WHERE status = ...)                    │
//! │  └── cascades side effects in the SAME transaction                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database                                                        │
//! │                                                                         │
//! │  Benefits:                                                              │
//! │  • Status rules enforced server-side, not by the UI                     │
//! │  • SQL is isolated in one place                                         │
//! │  • Multi-step writes are atomic                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`customer::CustomerRepository`] - Customer CRUD and import batches
//! - [`request::RequestRepository`] - Shopping request lifecycle
//! - [`invoice::InvoiceRepository`] - Invoice lifecycle and totals cache
//! - [`shipment::ShipmentRepository`] - Outbound shipments

pub mod customer;
pub mod invoice;
pub mod request;
pub mod shipment;
