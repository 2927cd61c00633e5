//! Invoice workflow integration tests: generation from a request, fee
//! layering, the card surcharge, and the draft-only edit lock.

mod common;

use common::{create_customer, plush_item, request_in_shopping, test_service};
use concierge_core::{InvoiceStatus, PaymentMethod, RequestItemStatus, RequestStatus};
use concierge_ops::service::LineItemInput;
use concierge_ops::ErrorCode;

/// One found plush at 2 × $25.00: tax $3.25, pickup $5.00, subtotal $58.25.
async fn invoice_from_single_item(
    service: &concierge_ops::ConciergeService,
) -> concierge_ops::service::InvoiceDetail {
    let customer_id = create_customer(service, "alice@example.com").await;
    let detail = request_in_shopping(
        service,
        &customer_id,
        vec![plush_item("Figment plush", 2, 2400)],
    )
    .await;

    let request_id = detail.request.id.clone();
    service
        .record_item_outcome(
            &detail.items[0].id,
            RequestItemStatus::Found,
            Some(2500),
            None,
        )
        .await
        .expect("record outcome");
    service
        .complete_shopping(&request_id)
        .await
        .expect("complete shopping");

    service
        .create_invoice_from_request(&request_id)
        .await
        .expect("generate invoice")
}

#[tokio::test]
async fn generated_invoice_layers_every_fee() {
    let service = test_service().await;
    let detail = invoice_from_single_item(&service).await;

    assert_eq!(detail.line_items.len(), 1);
    let line = &detail.line_items[0];
    assert_eq!(line.quantity, 2);
    assert_eq!(line.unit_price_cents, 2500);
    // 2 × $25.00 × 6.5% = $3.25, derived and stored at write time
    assert_eq!(line.tax_cents, 325);
    // Plush pickup fee is a flat $5.00
    assert_eq!(line.pickup_fee_cents, 500);

    // subtotal = 50.00 + 3.25 + 5.00 = 58.25, card fee disabled
    assert_eq!(detail.totals.items_subtotal.cents(), 5000);
    assert_eq!(detail.totals.tax.cents(), 325);
    assert_eq!(detail.totals.pickup.cents(), 500);
    assert!(detail.totals.cc_fee.is_zero());
    assert_eq!(detail.totals.total.cents(), 5825);

    // The cached columns match the live recomputation
    assert_eq!(detail.invoice.total_cents, 5825);
    assert_eq!(detail.invoice.status, InvoiceStatus::Draft);
}

#[tokio::test]
async fn card_surcharge_percentage_and_manual_override() {
    let service = test_service().await;
    let detail = invoice_from_single_item(&service).await;
    let id = detail.invoice.id.clone();

    // 3% of $58.25 = $1.7475 → $1.75; total lands on $60.00 even
    let with_fee = service
        .update_cc_fee(&id, true, 300, None)
        .await
        .expect("enable fee");
    assert_eq!(with_fee.totals.cc_fee.cents(), 175);
    assert_eq!(with_fee.totals.total.cents(), 6000);

    // Manual amount wins over the percentage while enabled
    let manual = service
        .update_cc_fee(&id, true, 300, Some(200))
        .await
        .expect("manual fee");
    assert_eq!(manual.totals.cc_fee.cents(), 200);
    assert_eq!(manual.totals.total.cents(), 6025);

    // Disabling zeroes the fee but keeps the stored settings
    let disabled = service
        .update_cc_fee(&id, false, 300, Some(200))
        .await
        .expect("disable fee");
    assert!(disabled.totals.cc_fee.is_zero());
    assert_eq!(disabled.totals.total.cents(), 5825);
    assert_eq!(disabled.invoice.cc_fee_manual_cents, Some(200));
}

#[tokio::test]
async fn billable_filter_and_request_cascade() {
    let service = test_service().await;
    let customer_id = create_customer(&service, "bob@example.com").await;

    let detail = request_in_shopping(
        &service,
        &customer_id,
        vec![
            plush_item("Figment plush", 1, 3000),
            plush_item("Orange Bird plush", 1, 2500),
            plush_item("Retired pin", 1, 1500),
        ],
    )
    .await;
    let request_id = detail.request.id.clone();

    service
        .record_item_outcome(&detail.items[0].id, RequestItemStatus::Found, Some(3499), None)
        .await
        .expect("found");
    service
        .record_item_outcome(
            &detail.items[1].id,
            RequestItemStatus::Substituted,
            Some(2999),
            Some("Got the 2026 edition instead".to_string()),
        )
        .await
        .expect("substituted");
    service
        .record_item_outcome(&detail.items[2].id, RequestItemStatus::NotFound, None, None)
        .await
        .expect("not found");

    service.complete_shopping(&request_id).await.expect("found");

    let invoice = service
        .create_invoice_from_request(&request_id)
        .await
        .expect("generate");

    // Exactly the 2 billable items made it onto the invoice
    assert_eq!(invoice.line_items.len(), 2);
    let names: Vec<_> = invoice.line_items.iter().map(|l| l.name.as_str()).collect();
    assert!(names.contains(&"Figment plush"));
    assert!(names.contains(&"Orange Bird plush"));
    assert!(!names.contains(&"Retired pin"));

    // Request cascaded to invoiced and now points at the invoice
    let request = service.get_request(&request_id).await.expect("request");
    assert_eq!(request.request.status, RequestStatus::Invoiced);
    assert_eq!(
        request.request.invoice_id.as_deref(),
        Some(invoice.invoice.id.as_str())
    );

    // A second generation attempt finds the request already invoiced
    let err = service
        .create_invoice_from_request(&request_id)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidTransition);
}

#[tokio::test]
async fn nothing_billable_is_rejected() {
    let service = test_service().await;
    let customer_id = create_customer(&service, "carol@example.com").await;

    let detail = request_in_shopping(
        &service,
        &customer_id,
        vec![plush_item("Sold out plush", 1, 3000)],
    )
    .await;
    let request_id = detail.request.id.clone();

    service
        .record_item_outcome(&detail.items[0].id, RequestItemStatus::NotFound, None, None)
        .await
        .expect("not found");
    service.complete_shopping(&request_id).await.expect("found");

    let err = service
        .create_invoice_from_request(&request_id)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::BusinessLogic);
    assert!(err.message.contains("no found or substituted items"));
}

#[tokio::test]
async fn manual_invoice_editing_and_deletion_totals() {
    let service = test_service().await;
    let customer_id = create_customer(&service, "dan@example.com").await;

    let draft = service
        .create_invoice(&customer_id, Some("Walk-in order".to_string()))
        .await
        .expect("draft");
    let id = draft.invoice.id.clone();
    assert_eq!(draft.totals.total.cents(), 0);

    let with_jersey = service
        .add_line_item(
            &id,
            LineItemInput {
                name: "Spirit Jersey".to_string(),
                quantity: 2,
                unit_price_cents: 7999,
                pickup_fee_cents: 500,
                shipping_fee_cents: 895,
                custom_fee_label: None,
                custom_fee_cents: 0,
            },
        )
        .await
        .expect("add");

    // tax = 2 × $79.99 × 6.5% = $10.40
    assert_eq!(with_jersey.line_items[0].tax_cents, 1040);
    let expected_total = 15998 + 1040 + 500 + 895;
    assert_eq!(with_jersey.totals.total.cents(), expected_total);

    // Editing quantity re-derives tax (3 × $79.99 × 6.5% = $15.60)
    let line_id = with_jersey.line_items[0].id.clone();
    let edited = service
        .update_line_item(
            &id,
            &line_id,
            LineItemInput {
                name: "Spirit Jersey".to_string(),
                quantity: 3,
                unit_price_cents: 7999,
                pickup_fee_cents: 500,
                shipping_fee_cents: 895,
                custom_fee_label: None,
                custom_fee_cents: 0,
            },
        )
        .await
        .expect("edit");
    assert_eq!(edited.line_items[0].tax_cents, 1560);
    assert_eq!(edited.totals.total.cents(), 23997 + 1560 + 500 + 895);

    // Deleting drops the total back to zero, never leaves the old cache
    let emptied = service.remove_line_item(&id, &line_id).await.expect("rm");
    assert!(emptied.line_items.is_empty());
    assert_eq!(emptied.totals.total.cents(), 0);
    assert_eq!(emptied.invoice.total_cents, 0);
}

#[tokio::test]
async fn lifecycle_locks_and_payment() {
    let service = test_service().await;
    let detail = invoice_from_single_item(&service).await;
    let id = detail.invoice.id.clone();
    let request_id = detail.invoice.request_id.clone().expect("linked request");

    let sent = service.send_invoice(&id).await.expect("send");
    assert_eq!(sent.invoice.status, InvoiceStatus::Sent);
    assert!(sent.invoice.sent_at.is_some());

    // Line items are locked server-side once the invoice leaves draft
    let err = service
        .add_line_item(
            &id,
            LineItemInput {
                name: "Late addition".to_string(),
                quantity: 1,
                unit_price_cents: 1000,
                pickup_fee_cents: 0,
                shipping_fee_cents: 0,
                custom_fee_label: None,
                custom_fee_cents: 0,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidTransition);

    let paid = service
        .record_payment(&id, PaymentMethod::Paypal, Some("PAYID-99".to_string()))
        .await
        .expect("pay");
    assert_eq!(paid.invoice.status, InvoiceStatus::Paid);
    assert_eq!(paid.invoice.payment_method, Some(PaymentMethod::Paypal));
    assert!(paid.invoice.paid_at.is_some());

    // Payment cascaded the request to paid
    let request = service.get_request(&request_id).await.expect("request");
    assert_eq!(request.request.status, RequestStatus::Paid);

    // Paid invoices cannot be cancelled, only refunded
    let err = service.cancel_invoice(&id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidTransition);

    let refunded = service.refund_invoice(&id).await.expect("refund");
    assert_eq!(refunded.invoice.status, InvoiceStatus::Refunded);
}

#[tokio::test]
async fn negative_inputs_rejected_at_the_boundary() {
    let service = test_service().await;
    let customer_id = create_customer(&service, "erin@example.com").await;

    let draft = service
        .create_invoice(&customer_id, None)
        .await
        .expect("draft");

    let err = service
        .add_line_item(
            &draft.invoice.id,
            LineItemInput {
                name: "Bad fee".to_string(),
                quantity: 1,
                unit_price_cents: 1000,
                pickup_fee_cents: -500,
                shipping_fee_cents: 0,
                custom_fee_label: None,
                custom_fee_cents: 0,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);

    let err = service
        .update_cc_fee(&draft.invoice.id, true, 300, Some(-1))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);
}
