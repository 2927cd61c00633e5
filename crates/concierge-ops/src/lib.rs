//! # concierge-ops: Workflow Layer for Concierge
//!
//! The operations layer for the merchandise concierge back office. Each
//! method on [`ConciergeService`] is one user-facing action: a button click
//! on the request board, the invoice editor, or the shipping panel.
//!
//! ## Layering
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Web frontend (TypeScript)                                              │
//! │       │ JSON                                                            │
//! │       ▼                                                                 │
//! │  ConciergeService (THIS CRATE)  ── DTO shaping, orchestration           │
//! │       │                                                                 │
//! │       ├── concierge-core  ── totals math, state machines, CSV mapping   │
//! │       └── concierge-db    ── transactions, guarded updates              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Error Contract
//! Every method returns `Result<T, OpsError>`; the error carries a
//! machine-readable code plus a human-readable message, ready to serialize
//! to the frontend.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod service;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::ServiceConfig;
pub use error::{ErrorCode, OpsError};
pub use service::ConciergeService;
