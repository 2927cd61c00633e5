//! # Request Workflows
//!
//! Request intake and the lifecycle actions the request board exposes.
//!
//! The board's progress bar renders from `progress` (the status position
//! index): steps below it are complete, the step at it is current.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use concierge_core::validation::{validate_cents, validate_name, validate_quantity};
use concierge_core::{
    ItemCategory, Request, RequestItem, RequestItemStatus, RequestStatus,
};
use concierge_db::repository::request::new_request;

use crate::error::OpsError;
use crate::service::ConciergeService;

/// Input for one requested item.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRequestItem {
    pub name: String,
    pub details: Option<String>,
    pub quantity: i64,
    pub category: ItemCategory,
    pub estimated_price_cents: Option<i64>,
}

/// Input for creating a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRequest {
    pub customer_id: String,
    pub title: String,
    pub notes: Option<String>,
    pub items: Vec<NewRequestItem>,
}

/// A request with its items and progress position.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDetail {
    pub request: Request,
    pub items: Vec<RequestItem>,
    /// Position of the current status in the lifecycle (0-9).
    pub progress: u8,
}

impl ConciergeService {
    /// Creates a pending request with its items.
    pub async fn create_request(&self, input: NewRequest) -> Result<RequestDetail, OpsError> {
        validate_name("title", &input.title).map_err(|e| OpsError::validation(e.to_string()))?;

        // The customer must exist before we take their request
        self.get_customer(&input.customer_id).await?;

        let request = new_request(&input.customer_id, input.title.trim(), input.notes);

        let now = Utc::now();
        let mut items = Vec::with_capacity(input.items.len());
        for item in input.items {
            validate_name("item name", &item.name)
                .and_then(|_| validate_quantity(item.quantity))
                .map_err(|e| OpsError::validation(e.to_string()))?;
            if let Some(cents) = item.estimated_price_cents {
                validate_cents("estimated_price", cents)
                    .map_err(|e| OpsError::validation(e.to_string()))?;
            }

            items.push(RequestItem {
                id: Uuid::new_v4().to_string(),
                request_id: request.id.clone(),
                name: item.name.trim().to_string(),
                details: item.details,
                quantity: item.quantity,
                category: item.category,
                status: RequestItemStatus::Pending,
                estimated_price_cents: item.estimated_price_cents,
                found_price_cents: None,
                substitution_note: None,
                created_at: now,
                updated_at: now,
            });
        }

        self.db().requests().create(&request, &items).await?;

        info!(id = %request.id, items = items.len(), "Request created");
        self.get_request(&request.id).await
    }

    /// Gets a request with items and progress.
    pub async fn get_request(&self, id: &str) -> Result<RequestDetail, OpsError> {
        let request = self
            .db()
            .requests()
            .get_by_id(id)
            .await?
            .ok_or_else(|| OpsError::not_found("Request", id))?;

        let items = self.db().requests().get_items(id).await?;
        let progress = request.status.position();

        Ok(RequestDetail {
            request,
            items,
            progress,
        })
    }

    /// Lists requests in a given status, newest first.
    pub async fn list_requests(
        &self,
        status: RequestStatus,
        limit: u32,
    ) -> Result<Vec<Request>, OpsError> {
        Ok(self.db().requests().list_by_status(status, limit).await?)
    }

    /// `pending → quoted`: the estimate went out.
    pub async fn quote_request(&self, id: &str) -> Result<RequestDetail, OpsError> {
        self.transition_request(id, RequestStatus::Quoted).await
    }

    /// `pending | quoted → approved`: customer accepted; stamps approval.
    pub async fn approve_request(&self, id: &str) -> Result<RequestDetail, OpsError> {
        self.transition_request(id, RequestStatus::Approved).await
    }

    /// `approved → scheduled`: assigned to a shopping trip.
    pub async fn schedule_request(&self, id: &str) -> Result<RequestDetail, OpsError> {
        self.transition_request(id, RequestStatus::Scheduled).await
    }

    /// `scheduled → approved`: pulled off a trip (the one backward edge).
    pub async fn unschedule_request(&self, id: &str) -> Result<RequestDetail, OpsError> {
        self.transition_request(id, RequestStatus::Approved).await
    }

    /// `scheduled → shopping`: the shopper entered the park.
    pub async fn start_shopping(&self, id: &str) -> Result<RequestDetail, OpsError> {
        self.transition_request(id, RequestStatus::Shopping).await
    }

    /// `shopping → found`: shopping done, item outcomes recorded.
    pub async fn complete_shopping(&self, id: &str) -> Result<RequestDetail, OpsError> {
        self.transition_request(id, RequestStatus::Found).await
    }

    /// Records one item's shopping outcome (found price, substitution,
    /// not found).
    pub async fn record_item_outcome(
        &self,
        item_id: &str,
        status: RequestItemStatus,
        found_price_cents: Option<i64>,
        substitution_note: Option<String>,
    ) -> Result<RequestItem, OpsError> {
        let item = self
            .db()
            .requests()
            .update_item(item_id, status, found_price_cents, substitution_note)
            .await?;

        info!(item_id = %item_id, status = ?status, "Item outcome recorded");
        Ok(item)
    }

    async fn transition_request(
        &self,
        id: &str,
        next: RequestStatus,
    ) -> Result<RequestDetail, OpsError> {
        let request = self.db().requests().transition(id, next).await?;
        info!(id = %id, status = %request.status, "Request transitioned");
        self.get_request(id).await
    }
}
