//! # Shipment Workflows
//!
//! Shipping a paid request and recording delivery. Label purchase and
//! tracking webhooks live in the carrier integration; these methods store
//! what it hands back and advance the request lifecycle.

use serde::{Deserialize, Serialize};
use tracing::info;

use concierge_core::validation::validate_name;
use concierge_core::Shipment;
use concierge_db::repository::shipment::new_shipment;

use crate::error::OpsError;
use crate::service::ConciergeService;

/// Input for creating a shipment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewShipment {
    pub request_id: String,
    pub carrier: String,
    pub tracking_number: String,
    pub label_cost_cents: Option<i64>,
}

impl ConciergeService {
    /// Creates a shipment for a paid request; the request moves
    /// `paid → shipped` in the same transaction.
    pub async fn create_shipment(&self, input: NewShipment) -> Result<Shipment, OpsError> {
        validate_name("carrier", &input.carrier)
            .and_then(|_| validate_name("tracking_number", &input.tracking_number))
            .map_err(|e| OpsError::validation(e.to_string()))?;

        let shipment = new_shipment(
            &input.request_id,
            input.carrier.trim(),
            input.tracking_number.trim(),
            input.label_cost_cents,
        );

        let created = self.db().shipments().create(&shipment).await?;

        info!(id = %created.id, request_id = %created.request_id,
              tracking = %created.tracking_number, "Shipment created");
        Ok(created)
    }

    /// Records carrier delivery confirmation; the request moves
    /// `shipped → delivered`.
    pub async fn mark_delivered(&self, shipment_id: &str) -> Result<Shipment, OpsError> {
        let shipment = self.db().shipments().mark_delivered(shipment_id).await?;
        info!(id = %shipment_id, "Shipment delivered");
        Ok(shipment)
    }

    /// Lists shipments for a request.
    pub async fn get_shipments(&self, request_id: &str) -> Result<Vec<Shipment>, OpsError> {
        Ok(self.db().shipments().get_by_request(request_id).await?)
    }
}
