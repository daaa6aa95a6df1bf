use actix_web::http::StatusCode;
use market_engine::db_types::Role;
use serde_json::json;

use super::helpers::{delete, get, post_json, put_json, TestServer};

#[actix_web::test]
async fn cart_reads_are_cached_and_writes_invalidate() {
    let srv = TestServer::new().await;
    let buyer = srv.create_user("buyer@example.com", Role::Buyer).await;
    let artist = srv.create_user("artist@example.com", Role::Artist).await;
    let mug = srv.create_product(artist.id, "Glazed mug", 40_00, 5).await;
    let token = srv.token(&buyer);

    let (status, res) = srv.request(post_json("/api/cart", &token, &json!({ "product_id": mug.id, "quantity": 1 }))).await;
    assert_eq!(status, StatusCode::OK, "{res}");

    let (_, res) = srv.request(get("/api/cart", &token)).await;
    assert_eq!(res["source"], "db");
    let (_, res) = srv.request(get("/api/cart", &token)).await;
    assert_eq!(res["source"], "cache");

    // A second add merges into the existing line and drops the cached snapshot
    srv.request(post_json("/api/cart", &token, &json!({ "product_id": mug.id, "quantity": 2 }))).await;
    let (_, res) = srv.request(get("/api/cart", &token)).await;
    assert_eq!(res["source"], "db");
    assert_eq!(res["data"].as_array().unwrap().len(), 1);
    assert_eq!(res["data"][0]["quantity"], 3);
}

#[actix_web::test]
async fn setting_quantity_to_zero_removes_the_line() {
    let srv = TestServer::new().await;
    let buyer = srv.create_user("buyer@example.com", Role::Buyer).await;
    let artist = srv.create_user("artist@example.com", Role::Artist).await;
    let mug = srv.create_product(artist.id, "Glazed mug", 40_00, 5).await;
    let token = srv.token(&buyer);
    srv.add_to_cart(buyer.id, mug.id, 2).await;

    let (status, _) =
        srv.request(put_json(&format!("/api/cart/{}", mug.id), &token, &json!({ "quantity": 0 }))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, res) = srv.request(get("/api/cart", &token)).await;
    assert!(res["data"].as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn invalid_cart_requests_are_rejected() {
    let srv = TestServer::new().await;
    let buyer = srv.create_user("buyer@example.com", Role::Buyer).await;
    let artist = srv.create_user("artist@example.com", Role::Artist).await;
    let mug = srv.create_product(artist.id, "Glazed mug", 40_00, 5).await;
    let token = srv.token(&buyer);

    let (status, _) =
        srv.request(post_json("/api/cart", &token, &json!({ "product_id": mug.id, "quantity": -1 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = srv.request(post_json("/api/cart", &token, &json!({ "product_id": 999, "quantity": 1 }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn clearing_the_cart_is_idempotent() {
    let srv = TestServer::new().await;
    let buyer = srv.create_user("buyer@example.com", Role::Buyer).await;
    let artist = srv.create_user("artist@example.com", Role::Artist).await;
    let mug = srv.create_product(artist.id, "Glazed mug", 40_00, 5).await;
    let token = srv.token(&buyer);
    srv.add_to_cart(buyer.id, mug.id, 1).await;

    let (status, _) = srv.request(delete("/api/cart", &token)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = srv.request(delete("/api/cart", &token)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, res) = srv.request(get("/api/cart", &token)).await;
    assert!(res["data"].as_array().unwrap().is_empty());
}
