use actix_web::http::StatusCode;
use market_engine::{db_types::Role, AuthApi};
use serde_json::json;

use super::helpers::{get, post_json, TestServer, TEST_PASSWORD};
use crate::auth::hash_password;

#[actix_web::test]
async fn signup_verify_and_login_flow() {
    let srv = TestServer::new().await;

    let body = json!({ "email": "new@example.com", "display_name": "New", "password": TEST_PASSWORD });
    let (status, res) = srv.request(post_json("/auth/register", "", &body)).await;
    assert_eq!(status, StatusCode::CREATED, "{res}");
    assert_eq!(res["email"], "new@example.com");

    // No account exists yet, so a login must fail
    let creds = json!({ "email": "new@example.com", "password": TEST_PASSWORD });
    let (status, _) = srv.request(post_json("/auth", "", &creds)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Re-registering replaces the pending row; this is also how the test learns the code
    let auth = AuthApi::new(srv.db.clone(), chrono::Duration::hours(1));
    let pending = auth
        .register("new@example.com".to_string(), "New".to_string(), hash_password(TEST_PASSWORD))
        .await
        .unwrap();

    let wrong_code = if pending.verification_code == "000000" { "000001" } else { "000000" };
    let (status, _) =
        srv.request(post_json("/auth/verify", "", &json!({ "email": "new@example.com", "code": wrong_code }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let verify = json!({ "email": "new@example.com", "code": pending.verification_code });
    let (status, res) = srv.request(post_json("/auth/verify", "", &verify)).await;
    assert_eq!(status, StatusCode::OK, "{res}");
    let token = res["token"].as_str().unwrap().to_string();

    // The token from verification is immediately usable
    let (status, _) = srv.request(get("/api/orders", &token)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, res) = srv.request(post_json("/auth", "", &creds)).await;
    assert_eq!(status, StatusCode::OK, "{res}");
    assert!(res["token"].as_str().is_some());
}

#[actix_web::test]
async fn wrong_passwords_and_unknown_emails_read_the_same() {
    let srv = TestServer::new().await;
    srv.create_user("known@example.com", Role::Buyer).await;

    let (status, res) =
        srv.request(post_json("/auth", "", &json!({ "email": "known@example.com", "password": "wrong" }))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let wrong_password = res["error"].clone();

    let (status, res) =
        srv.request(post_json("/auth", "", &json!({ "email": "nobody@example.com", "password": "wrong" }))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(res["error"], wrong_password, "unknown emails must not be distinguishable");
}

#[actix_web::test]
async fn garbage_tokens_are_rejected() {
    let srv = TestServer::new().await;
    let (status, _) = srv.request(get("/api/orders", "not-a-token")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
