use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use actix_web::http::StatusCode;
use market_engine::{
    db_types::Role,
    helpers::sign_payment,
    traits::{PaymentGatewayError, PaymentIntent},
};
use serde_json::json;

use super::helpers::{get, post_json, put_json, MockGateway, TestServer, TEST_API_SECRET, TEST_GATEWAY_SECRET};

#[actix_web::test]
async fn cod_checkout_places_an_order() {
    let srv = TestServer::new().await;
    let buyer = srv.create_user("buyer@example.com", Role::Buyer).await;
    let artist = srv.create_user("artist@example.com", Role::Artist).await;
    let address = srv.create_address(buyer.id).await;
    let mug = srv.create_product(artist.id, "Glazed mug", 40_00, 5).await;
    let coaster = srv.create_product(artist.id, "Cork coaster", 10_00, 3).await;
    srv.add_to_cart(buyer.id, mug.id, 2).await;
    srv.add_to_cart(buyer.id, coaster.id, 1).await;
    let token = srv.token(&buyer);

    let body = json!({ "address_id": address.id, "payment_method": "cod" });
    let (status, res) = srv.request(post_json("/api/orders", &token, &body)).await;
    assert_eq!(status, StatusCode::CREATED, "{res}");
    assert_eq!(res["outcome"], "placed");
    // 90.00 of goods + 15.00 shipping + 8% tax on the subtotal
    assert_eq!(res["order"]["order"]["total"], 112_20);
    assert_eq!(res["order"]["order"]["payment_status"], "Unpaid");
    let order_id = res["order"]["order"]["order_id"].as_str().unwrap().to_string();

    // The checkout wrote the first page of the order list through to the cache
    let (status, res) = srv.request(get("/api/orders", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(res["source"], "cache");
    assert_eq!(res["data"].as_array().unwrap().len(), 1);

    let (status, res) = srv.request(get(&format!("/api/orders/{order_id}"), &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(res["data"]["items"].as_array().unwrap().len(), 2);
}

#[actix_web::test]
async fn requests_without_a_token_are_unauthorized() {
    let srv = TestServer::new().await;
    let (status, _) = srv.request(get("/api/orders", "")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    // Public routes stay open
    let (status, _) = srv.request(get("/products", "")).await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn payment_status_updates_are_admin_only() {
    let srv = TestServer::new().await;
    let buyer = srv.create_user("buyer@example.com", Role::Buyer).await;
    let token = srv.token(&buyer);
    let body = json!({ "payment_status": "Paid", "txid": "txn-1" });
    let (status, _) = srv.request(put_json("/api/orders/ord-1/payment-status", &token, &body)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

/// A mock gateway backed by a shared intent table, so create and fetch see the same state.
fn stateful_gateway() -> Arc<MockGateway> {
    let intents: Arc<Mutex<HashMap<String, PaymentIntent>>> = Arc::default();
    let mut gateway = MockGateway::new();
    let store = Arc::clone(&intents);
    gateway.expect_create_intent().returning(move |intent| {
        let mut store = store.lock().unwrap();
        let id = format!("order_mock_{}", store.len() + 1);
        let stored = PaymentIntent {
            id: id.clone(),
            amount: intent.amount,
            currency: intent.currency,
            receipt: intent.receipt,
            notes: intent.notes,
            status: "created".to_string(),
        };
        store.insert(id, stored.clone());
        Ok(stored)
    });
    let store = Arc::clone(&intents);
    gateway.expect_fetch_intent().returning(move |id| {
        store.lock().unwrap().get(id).cloned().ok_or_else(|| PaymentGatewayError::IntentNotFound(id.to_string()))
    });
    Arc::new(gateway)
}

#[actix_web::test]
async fn gateway_checkout_requires_a_valid_signature() {
    let srv = TestServer::with_gateway(stateful_gateway()).await;
    let buyer = srv.create_user("buyer@example.com", Role::Buyer).await;
    let artist = srv.create_user("artist@example.com", Role::Artist).await;
    let address = srv.create_address(buyer.id).await;
    let mug = srv.create_product(artist.id, "Glazed mug", 40_00, 5).await;
    srv.add_to_cart(buyer.id, mug.id, 1).await;
    let token = srv.token(&buyer);

    let body = json!({ "address_id": address.id, "payment_method": "razorpay" });
    let (status, res) = srv.request(post_json("/api/orders", &token, &body)).await;
    assert_eq!(status, StatusCode::CREATED, "{res}");
    assert_eq!(res["outcome"], "payment_required");
    let gateway_order_id = res["gateway_order_id"].as_str().unwrap().to_string();

    // Nothing was persisted by the intent creation
    let (_, res) = srv.request(get("/api/orders", &token)).await;
    assert!(res["data"].as_array().unwrap().is_empty());

    // A tampered signature creates no order and leaks nothing
    let bad = json!({
        "gateway_order_id": gateway_order_id,
        "gateway_payment_id": "pay_123",
        "gateway_signature": "deadbeef",
    });
    let (status, res) = srv.request(post_json("/api/orders/verify-payment", &token, &bad)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(res["error"], "Payment verification failed");

    // A signature computed with the server's token secret is just as invalid
    let wrong_secret = json!({
        "gateway_order_id": gateway_order_id,
        "gateway_payment_id": "pay_123",
        "gateway_signature": sign_payment(TEST_API_SECRET, &gateway_order_id, "pay_123"),
    });
    let (status, _) = srv.request(post_json("/api/orders/verify-payment", &token, &wrong_secret)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let signature = sign_payment(TEST_GATEWAY_SECRET, &gateway_order_id, "pay_123");
    let good = json!({
        "gateway_order_id": gateway_order_id,
        "gateway_payment_id": "pay_123",
        "gateway_signature": signature,
    });
    let (status, res) = srv.request(post_json("/api/orders/verify-payment", &token, &good)).await;
    assert_eq!(status, StatusCode::OK, "{res}");
    assert_eq!(res["order"]["payment_status"], "Paid");
    assert_eq!(res["order"]["payment_txid"], "pay_123");
}

#[actix_web::test]
async fn a_buyer_can_cancel_a_pending_order() {
    let srv = TestServer::new().await;
    let buyer = srv.create_user("buyer@example.com", Role::Buyer).await;
    let artist = srv.create_user("artist@example.com", Role::Artist).await;
    let address = srv.create_address(buyer.id).await;
    let mug = srv.create_product(artist.id, "Glazed mug", 40_00, 5).await;
    srv.add_to_cart(buyer.id, mug.id, 2).await;
    let token = srv.token(&buyer);

    let body = json!({ "address_id": address.id, "payment_method": "cod" });
    let (_, res) = srv.request(post_json("/api/orders", &token, &body)).await;
    let order_id = res["order"]["order"]["order_id"].as_str().unwrap().to_string();

    let (status, res) = srv.request(put_json(&format!("/api/orders/{order_id}/cancel"), &token, &json!({}))).await;
    assert_eq!(status, StatusCode::OK, "{res}");
    assert_eq!(res["status"], "Cancelled");

    // Another buyer's orders are invisible, so their cancel attempt reads as not found
    let stranger = srv.create_user("stranger@example.com", Role::Buyer).await;
    let (status, _) =
        srv.request(put_json(&format!("/api/orders/{order_id}/cancel"), &srv.token(&stranger), &json!({}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
