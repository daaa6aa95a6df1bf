use std::{sync::Arc, time::Duration};

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use market_engine::{
    cache::{MarketCache, MemoryCacheStore, RedisCacheStore},
    traits::{OrderNotifier, PaymentGateway},
    AuthApi,
    CartApi,
    CatalogApi,
    OrderFlowApi,
    SqliteDatabase,
};
use razorpay_tools::RazorpayApi;

use crate::{
    auth::TokenIssuer,
    config::ServerConfig,
    errors::ServerError,
    expiry_worker::start_expiry_worker,
    integrations::{LogMailer, RazorpayGateway},
    routes,
};

const EXPIRY_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let cache = match &config.cache_url {
        Some(url) => {
            let store =
                RedisCacheStore::connect(url).await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
            MarketCache::new(Arc::new(store))
        },
        None => MarketCache::new(Arc::new(MemoryCacheStore::new())),
    };
    let razorpay =
        RazorpayApi::new(config.razorpay.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let gateway: Arc<dyn PaymentGateway> = Arc::new(RazorpayGateway::new(razorpay));
    let notifier: Arc<dyn OrderNotifier> = Arc::new(LogMailer);
    let auth_api = AuthApi::new(db.clone(), config.signup_ttl);
    start_expiry_worker(auth_api, EXPIRY_SWEEP_INTERVAL);
    let srv = create_server_instance(config, db, cache, gateway, notifier)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    cache: MarketCache,
    gateway: Arc<dyn PaymentGateway>,
    notifier: Arc<dyn OrderNotifier>,
) -> Result<Server, ServerError> {
    let host = config.host.clone();
    let port = config.port;
    let srv = HttpServer::new(move || {
        let orders_api = OrderFlowApi::new(
            db.clone(),
            cache.clone(),
            Arc::clone(&gateway),
            Arc::clone(&notifier),
            // Razorpay signs callbacks with the API key secret, not our session secret
            config.razorpay.key_secret.clone(),
        );
        let cart_api = CartApi::new(db.clone(), cache.clone());
        let catalog_api = CatalogApi::new(db.clone(), cache.clone());
        let auth_api = AuthApi::new(db.clone(), config.signup_ttl);
        let issuer = TokenIssuer::new(config.api_secret.clone());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("market::access_log"))
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(cart_api))
            .app_data(web::Data::new(catalog_api))
            .app_data(web::Data::new(auth_api))
            .app_data(web::Data::new(issuer))
            .configure(configure_routes)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((host.as_str(), port))?
    .run();
    Ok(srv)
}

/// The full route table. Shared between the real server and the endpoint tests so the two can
/// never drift apart.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    // Routes that require a bearer token; the Claims extractor rejects anything else
    let auth_scope = web::scope("/api")
        .service(routes::create_order)
        .service(routes::verify_payment)
        .service(routes::list_orders)
        .service(routes::get_order)
        .service(routes::cancel_order)
        .service(routes::update_payment_status)
        .service(routes::update_order_status)
        .service(routes::get_cart)
        .service(routes::add_to_cart)
        .service(routes::set_cart_quantity)
        .service(routes::remove_from_cart)
        .service(routes::clear_cart)
        .service(routes::create_product)
        .service(routes::update_product)
        .service(routes::delete_product)
        .service(routes::get_wishlist)
        .service(routes::add_to_wishlist)
        .service(routes::remove_from_wishlist)
        .service(routes::create_review)
        .service(routes::update_review)
        .service(routes::delete_review)
        .service(routes::create_address)
        .service(routes::list_addresses);
    cfg.service(auth_scope)
        .service(routes::health)
        .service(routes::login)
        .service(routes::register)
        .service(routes::verify)
        .service(routes::list_products)
        .service(routes::get_product)
        .service(routes::product_reviews);
}
