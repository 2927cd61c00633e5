//! Request lifecycle integration tests: the full pending → delivered walk,
//! the unassignment edge, and illegal-jump rejection.

mod common;

use common::{create_customer, plush_item, request_in_shopping, test_service};
use concierge_core::{RequestItemStatus, RequestStatus};
use concierge_ops::service::{NewRequest, NewShipment};
use concierge_ops::ErrorCode;

#[tokio::test]
async fn full_lifecycle_to_delivered() {
    let service = test_service().await;
    let customer_id = create_customer(&service, "alice@example.com").await;

    let detail = request_in_shopping(
        &service,
        &customer_id,
        vec![plush_item("Figment plush", 1, 3000)],
    )
    .await;
    let request_id = detail.request.id.clone();
    assert_eq!(detail.request.status, RequestStatus::Shopping);
    assert_eq!(detail.progress, 4);

    service
        .record_item_outcome(&detail.items[0].id, RequestItemStatus::Found, Some(3499), None)
        .await
        .expect("outcome");
    let found = service.complete_shopping(&request_id).await.expect("found");
    assert_eq!(found.progress, 5);

    let invoice = service
        .create_invoice_from_request(&request_id)
        .await
        .expect("invoice");
    service
        .send_invoice(&invoice.invoice.id)
        .await
        .expect("send");
    service
        .record_payment(
            &invoice.invoice.id,
            concierge_core::PaymentMethod::Stripe,
            None,
        )
        .await
        .expect("pay");

    let paid = service.get_request(&request_id).await.expect("request");
    assert_eq!(paid.request.status, RequestStatus::Paid);
    assert_eq!(paid.progress, 7);

    let shipment = service
        .create_shipment(NewShipment {
            request_id: request_id.clone(),
            carrier: "USPS".to_string(),
            tracking_number: "9400111899223100000000".to_string(),
            label_cost_cents: Some(895),
        })
        .await
        .expect("ship");

    let shipped = service.get_request(&request_id).await.expect("request");
    assert_eq!(shipped.request.status, RequestStatus::Shipped);

    service
        .mark_delivered(&shipment.id)
        .await
        .expect("deliver");

    let delivered = service.get_request(&request_id).await.expect("request");
    assert_eq!(delivered.request.status, RequestStatus::Delivered);
    assert_eq!(delivered.progress, 9);

    let shipments = service.get_shipments(&request_id).await.expect("list");
    assert_eq!(shipments.len(), 1);
    assert!(shipments[0].delivered_at.is_some());
}

#[tokio::test]
async fn approval_stamps_and_unassignment_reverts() {
    let service = test_service().await;
    let customer_id = create_customer(&service, "bob@example.com").await;

    let detail = service
        .create_request(NewRequest {
            customer_id,
            title: "Castle tee run".to_string(),
            notes: None,
            items: vec![plush_item("Castle Tee", 1, 2999)],
        })
        .await
        .expect("create");
    let id = detail.request.id.clone();
    assert!(detail.request.approved_at.is_none());

    let approved = service.approve_request(&id).await.expect("approve");
    assert!(approved.request.approved_at.is_some());
    let stamp = approved.request.approved_at;

    let scheduled = service.schedule_request(&id).await.expect("schedule");
    assert_eq!(scheduled.request.status, RequestStatus::Scheduled);

    // Unassignment walks back to approved without touching the stamp
    let unscheduled = service.unschedule_request(&id).await.expect("unschedule");
    assert_eq!(unscheduled.request.status, RequestStatus::Approved);
    assert_eq!(unscheduled.request.approved_at, stamp);
}

#[tokio::test]
async fn illegal_jumps_are_rejected() {
    let service = test_service().await;
    let customer_id = create_customer(&service, "carol@example.com").await;

    let detail = service
        .create_request(NewRequest {
            customer_id,
            title: "Pin run".to_string(),
            notes: None,
            items: vec![],
        })
        .await
        .expect("create");
    let id = detail.request.id.clone();

    // pending → shopping skips the whole middle of the lifecycle
    let err = service.start_shopping(&id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidTransition);

    // pending → found likewise
    let err = service.complete_shopping(&id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidTransition);

    // Shipping an unpaid request is refused
    let err = service
        .create_shipment(NewShipment {
            request_id: id.clone(),
            carrier: "UPS".to_string(),
            tracking_number: "1Z999".to_string(),
            label_cost_cents: None,
        })
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidTransition);
}

#[tokio::test]
async fn billable_outcome_requires_a_price() {
    let service = test_service().await;
    let customer_id = create_customer(&service, "dan@example.com").await;

    let detail = request_in_shopping(
        &service,
        &customer_id,
        vec![plush_item("Figment plush", 1, 3000)],
    )
    .await;

    let err = service
        .record_item_outcome(&detail.items[0].id, RequestItemStatus::Found, None, None)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::BusinessLogic);
    assert!(err.message.contains("no found price"));
}

#[tokio::test]
async fn listing_by_status() {
    let service = test_service().await;
    let customer_id = create_customer(&service, "erin@example.com").await;

    for title in ["Run one", "Run two"] {
        service
            .create_request(NewRequest {
                customer_id: customer_id.clone(),
                title: title.to_string(),
                notes: None,
                items: vec![],
            })
            .await
            .expect("create");
    }

    let pending = service
        .list_requests(RequestStatus::Pending, 10)
        .await
        .expect("list");
    assert_eq!(pending.len(), 2);

    let shopping = service
        .list_requests(RequestStatus::Shopping, 10)
        .await
        .expect("list");
    assert!(shopping.is_empty());
}
