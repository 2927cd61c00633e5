//! Shared helpers for workflow integration tests.

use concierge_core::ItemCategory;
use concierge_db::{Database, DbConfig};
use concierge_ops::service::{NewCustomer, NewRequest, NewRequestItem, RequestDetail};
use concierge_ops::{ConciergeService, ServiceConfig};

/// Builds a service over a fresh in-memory database.
pub async fn test_service() -> ConciergeService {
    let db = Database::new(DbConfig::in_memory())
        .await
        .expect("in-memory database");
    ConciergeService::new(db, ServiceConfig::default())
}

/// Creates a throwaway customer and returns its id.
pub async fn create_customer(service: &ConciergeService, email: &str) -> String {
    let customer = service
        .create_customer(NewCustomer {
            name: "Alice Park".to_string(),
            email: email.to_string(),
            phone: None,
            address_line1: Some("123 Main St".to_string()),
            address_line2: None,
            city: Some("Orlando".to_string()),
            state: Some("FL".to_string()),
            postal_code: Some("32830".to_string()),
            country: Some("US".to_string()),
            notes: None,
        })
        .await
        .expect("create customer");
    customer.id
}

/// A plush item input at the given estimated price.
pub fn plush_item(name: &str, quantity: i64, estimate_cents: i64) -> NewRequestItem {
    NewRequestItem {
        name: name.to_string(),
        details: None,
        quantity,
        category: ItemCategory::Plush,
        estimated_price_cents: Some(estimate_cents),
    }
}

/// Creates a request and walks it to `shopping` so item outcomes can be
/// recorded.
pub async fn request_in_shopping(
    service: &ConciergeService,
    customer_id: &str,
    items: Vec<NewRequestItem>,
) -> RequestDetail {
    let detail = service
        .create_request(NewRequest {
            customer_id: customer_id.to_string(),
            title: "Epcot pin run".to_string(),
            notes: None,
            items,
        })
        .await
        .expect("create request");

    let id = &detail.request.id;
    service.quote_request(id).await.expect("quote");
    service.approve_request(id).await.expect("approve");
    service.schedule_request(id).await.expect("schedule");
    service.start_shopping(id).await.expect("start shopping")
}
