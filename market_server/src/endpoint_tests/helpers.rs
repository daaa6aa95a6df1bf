//! Shared plumbing for the endpoint tests: a real SQLite store, an in-memory cache, a mocked
//! payment gateway, and a way to fire requests at the production route table.

use std::sync::Arc;

use actix_web::{http::StatusCode, test, test::TestRequest, web, App};
use async_trait::async_trait;
use market_common::{Money, Secret};
use market_engine::{
    cache::MarketCache,
    db_types::{Address, NewAddress, NewProduct, Product, Role, User},
    test_utils::{prepare_test_env, random_db_path},
    traits::{
        CartManagement,
        CatalogManagement,
        NewPaymentIntent,
        NotifyError,
        OrderConfirmation,
        OrderNotifier,
        PaymentGateway,
        PaymentGatewayError,
        PaymentIntent,
    },
    AuthApi,
    CartApi,
    CatalogApi,
    OrderFlowApi,
    SqliteDatabase,
};
use mockall::mock;
use serde_json::Value;

use crate::{
    auth::{hash_password, TokenIssuer},
    server::configure_routes,
};

pub const TEST_API_SECRET: &str = "endpoint-test-secret";
/// Deliberately different from the token secret: payment signatures come from the gateway's key
/// secret, and a server that conflates the two must fail these tests.
pub const TEST_GATEWAY_SECRET: &str = "endpoint-test-gateway-key";
pub const TEST_PASSWORD: &str = "correct-horse-battery";

mock! {
    pub Gateway {}

    #[async_trait]
    impl PaymentGateway for Gateway {
        async fn create_intent(&self, intent: NewPaymentIntent) -> Result<PaymentIntent, PaymentGatewayError>;
        async fn fetch_intent(&self, intent_id: &str) -> Result<PaymentIntent, PaymentGatewayError>;
    }
}

pub struct NullNotifier;

#[async_trait]
impl OrderNotifier for NullNotifier {
    async fn order_confirmation(&self, _confirmation: OrderConfirmation) -> Result<(), NotifyError> {
        Ok(())
    }
}

pub struct TestServer {
    pub db: SqliteDatabase,
    pub cache: MarketCache,
    pub issuer: TokenIssuer,
    gateway: Arc<dyn PaymentGateway>,
    signup_ttl: chrono::Duration,
}

impl TestServer {
    /// A server whose gateway panics if touched. Fine for everything except the razorpay flow.
    pub async fn new() -> Self {
        Self::with_gateway(Arc::new(MockGateway::new())).await
    }

    pub async fn with_gateway(gateway: Arc<dyn PaymentGateway>) -> Self {
        let url = random_db_path();
        prepare_test_env(&url).await;
        let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating database");
        Self {
            db,
            cache: MarketCache::in_memory(),
            issuer: TokenIssuer::new(Secret::new(TEST_API_SECRET.to_string())),
            gateway,
            signup_ttl: chrono::Duration::hours(1),
        }
    }

    /// Run one request against the production route table and return the status with the parsed
    /// body.
    pub async fn request(&self, req: TestRequest) -> (StatusCode, Value) {
        let orders_api = OrderFlowApi::new(
            self.db.clone(),
            self.cache.clone(),
            Arc::clone(&self.gateway),
            Arc::new(NullNotifier),
            Secret::new(TEST_GATEWAY_SECRET.to_string()),
        );
        let app = App::new()
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(CartApi::new(self.db.clone(), self.cache.clone())))
            .app_data(web::Data::new(CatalogApi::new(self.db.clone(), self.cache.clone())))
            .app_data(web::Data::new(AuthApi::new(self.db.clone(), self.signup_ttl)))
            .app_data(web::Data::new(self.issuer.clone()))
            .configure(configure_routes);
        let service = test::init_service(app).await;
        let res = test::call_service(&service, req.to_request()).await;
        let status = res.status();
        let body = test::read_body(res).await;
        let body = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&body).into_owned()))
        };
        (status, body)
    }

    pub fn token(&self, user: &User) -> String {
        self.issuer.issue_token(user.id, user.role).expect("Error issuing token")
    }

    /// Register and verify an account through the engine, then force the requested role.
    pub async fn create_user(&self, email: &str, role: Role) -> User {
        let auth = AuthApi::new(self.db.clone(), self.signup_ttl);
        let pending = auth
            .register(email.to_string(), "Test".to_string(), hash_password(TEST_PASSWORD))
            .await
            .expect("Error registering");
        let user = auth.verify(email, &pending.verification_code).await.expect("Error verifying signup");
        if role != Role::Buyer {
            sqlx::query("UPDATE users SET role = ? WHERE id = ?")
                .bind(role)
                .bind(user.id)
                .execute(self.db.pool())
                .await
                .expect("Error updating role");
        }
        User { role, ..user }
    }

    pub async fn create_address(&self, buyer_id: i64) -> Address {
        self.db
            .insert_address(buyer_id, NewAddress {
                recipient: "Test Buyer".to_string(),
                line1: "1 Pottery Lane".to_string(),
                line2: None,
                city: "Jaipur".to_string(),
                state: "RJ".to_string(),
                postcode: "302001".to_string(),
                phone: None,
            })
            .await
            .expect("Error creating address")
    }

    pub async fn create_product(&self, artist_id: i64, name: &str, price: i64, stock: i64) -> Product {
        self.db
            .insert_product(NewProduct {
                artist_id,
                name: name.to_string(),
                description: String::new(),
                price: Money::from_minor(price),
                stock,
            })
            .await
            .expect("Error creating product")
    }

    pub async fn add_to_cart(&self, buyer_id: i64, product_id: i64, quantity: i64) {
        self.db.add_to_cart(buyer_id, product_id, quantity).await.expect("Error adding to cart");
    }
}

pub fn get(path: &str, token: &str) -> TestRequest {
    with_auth(TestRequest::get().uri(path), token)
}

pub fn post_json<T: serde::Serialize>(path: &str, token: &str, body: &T) -> TestRequest {
    with_auth(TestRequest::post().uri(path).set_json(body), token)
}

pub fn put_json<T: serde::Serialize>(path: &str, token: &str, body: &T) -> TestRequest {
    with_auth(TestRequest::put().uri(path).set_json(body), token)
}

pub fn delete(path: &str, token: &str) -> TestRequest {
    with_auth(TestRequest::delete().uri(path), token)
}

fn with_auth(req: TestRequest, token: &str) -> TestRequest {
    if token.is_empty() {
        req
    } else {
        req.insert_header(("Authorization", format!("Bearer {token}")))
    }
}
