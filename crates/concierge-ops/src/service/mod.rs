//! # Concierge Service
//!
//! One method per user-facing action, grouped by aggregate:
//!
//! - [`customers`] - customer CRUD plus CSV import/export
//! - [`requests`] - request intake and lifecycle
//! - [`invoices`] - invoicing, fees, payment
//! - [`shipments`] - shipping and delivery
//!
//! The service is cheap to clone (the database handle is a pool wrapper);
//! each frontend session can hold its own copy.

use concierge_db::Database;

use crate::config::ServiceConfig;

pub mod customers;
pub mod invoices;
pub mod requests;
pub mod shipments;

pub use customers::{ImportReport, NewCustomer};
pub use invoices::{InvoiceDetail, LineItemInput};
pub use requests::{NewRequest, NewRequestItem, RequestDetail};
pub use shipments::NewShipment;

/// The workflow service: configuration plus repository access.
#[derive(Debug, Clone)]
pub struct ConciergeService {
    db: Database,
    config: ServiceConfig,
}

impl ConciergeService {
    /// Creates a service over an opened database.
    pub fn new(db: Database, config: ServiceConfig) -> Self {
        ConciergeService { db, config }
    }

    /// The active configuration.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub(crate) fn db(&self) -> &Database {
        &self.db
    }
}
