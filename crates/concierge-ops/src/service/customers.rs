//! # Customer Workflows
//!
//! Customer creation, lookup, and the CSV import/export pair.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use concierge_core::import::{export_customers_csv, parse_customers_csv, RowError};
use concierge_core::validation::{validate_email, validate_name};
use concierge_core::Customer;

use crate::error::OpsError;
use crate::service::ConciergeService;

/// Input for creating a customer by hand.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCustomer {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub notes: Option<String>,
}

/// What happened to an uploaded CSV.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    /// Customers actually inserted.
    pub imported: usize,
    /// Rows whose email already existed (left untouched).
    pub duplicates: usize,
    /// Rows that failed validation, with their 1-based positions.
    pub skipped: Vec<RowError>,
}

impl ConciergeService {
    /// Creates a customer.
    pub async fn create_customer(&self, input: NewCustomer) -> Result<Customer, OpsError> {
        validate_name("name", &input.name).map_err(|e| OpsError::validation(e.to_string()))?;
        validate_email(&input.email).map_err(|e| OpsError::validation(e.to_string()))?;

        let now = Utc::now();
        let customer = Customer {
            id: Uuid::new_v4().to_string(),
            name: input.name.trim().to_string(),
            email: input.email.trim().to_string(),
            phone: input.phone,
            address_line1: input.address_line1,
            address_line2: input.address_line2,
            city: input.city,
            state: input.state,
            postal_code: input.postal_code,
            country: input.country,
            notes: input.notes,
            created_at: now,
            updated_at: now,
        };

        self.db().customers().insert(&customer).await?;

        info!(id = %customer.id, "Customer created");
        Ok(customer)
    }

    /// Gets a customer by ID.
    pub async fn get_customer(&self, id: &str) -> Result<Customer, OpsError> {
        self.db()
            .customers()
            .get_by_id(id)
            .await?
            .ok_or_else(|| OpsError::not_found("Customer", id))
    }

    /// Lists customers ordered by name.
    pub async fn list_customers(&self, limit: u32) -> Result<Vec<Customer>, OpsError> {
        Ok(self.db().customers().list(limit).await?)
    }

    /// Imports customers from an uploaded CSV.
    ///
    /// Header mapping happens in core (typed failure when required columns
    /// are missing); valid rows are inserted in one batch transaction, rows
    /// with an existing email are skipped.
    pub async fn import_customers_csv(&self, data: &str) -> Result<ImportReport, OpsError> {
        let outcome = parse_customers_csv(data)?;
        debug!(rows = outcome.rows.len(), skipped = outcome.skipped.len(),
               "CSV parsed");

        let inserted = self
            .db()
            .customers()
            .insert_import_batch(&outcome.rows)
            .await?;

        let report = ImportReport {
            imported: inserted.len(),
            duplicates: outcome.rows.len() - inserted.len(),
            skipped: outcome.skipped,
        };

        info!(imported = report.imported, duplicates = report.duplicates,
              skipped = report.skipped.len(), "Customer import finished");
        Ok(report)
    }

    /// Exports all customers as CSV with canonical headers.
    pub async fn export_customers_csv(&self) -> Result<String, OpsError> {
        let customers = self.db().customers().list(u32::MAX).await?;
        Ok(export_customers_csv(&customers)?)
    }
}
