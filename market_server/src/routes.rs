//! HTTP route handlers.
//!
//! Handlers stay thin: deserialize, pull the caller identity from [`Claims`], delegate to an
//! engine API, and translate the result. Everything under `/api` requires a bearer token; role
//! checks happen per handler. Cached reads come back tagged with their source so clients (and the
//! tests) can see whether the cache served them.

use actix_web::{delete, get, post, put, web, HttpResponse};
use log::trace;
use market_engine::{
    db_types::{NewAddress, NewProduct, NewReview, OrderId, Role, UpdateProduct},
    AuthApi,
    CartApi,
    CatalogApi,
    OrderFlowApi,
    SqliteDatabase,
};
use serde_json::json;

use crate::{
    auth::{hash_password, verify_password, Claims, TokenIssuer},
    data_objects::{
        tagged,
        CartAddRequest,
        CartUpdateRequest,
        CreateOrderRequest,
        LoginRequest,
        LoginResponse,
        NewProductRequest,
        OrderListQuery,
        ProductListQuery,
        RegisterRequest,
        ReviewUpdateRequest,
        UpdateOrderStatusRequest,
        UpdatePaymentStatusRequest,
        VerifyPaymentRequest,
        VerifyRequest,
        WishlistAddRequest,
    },
    errors::{AuthError, ServerError},
};

type Orders = web::Data<OrderFlowApi<SqliteDatabase>>;
type Cart = web::Data<CartApi<SqliteDatabase>>;
type Catalog = web::Data<CatalogApi<SqliteDatabase>>;
type Auth = web::Data<AuthApi<SqliteDatabase>>;

//--------------------------------------       Health        ---------------------------------------------------------

#[get("/health")]
pub async fn health() -> HttpResponse {
    trace!("💻️ Health check");
    HttpResponse::Ok().body("👍️\n")
}

//--------------------------------------        Auth         ---------------------------------------------------------

/// Record a signup awaiting email verification. No account exists until the code is confirmed.
#[post("/auth/register")]
pub async fn register(body: web::Json<RegisterRequest>, api: Auth) -> Result<HttpResponse, ServerError> {
    let req = body.into_inner();
    let password_hash = hash_password(&req.password);
    let pending = api.register(req.email, req.display_name, password_hash).await?;
    Ok(HttpResponse::Created().json(json!({ "email": pending.email, "expires_at": pending.expires_at })))
}

/// Confirm a verification code, promoting the pending signup to a real account. Responds with a
/// ready-to-use access token so the client does not need a separate login round-trip.
#[post("/auth/verify")]
pub async fn verify(
    body: web::Json<VerifyRequest>,
    api: Auth,
    issuer: web::Data<TokenIssuer>,
) -> Result<HttpResponse, ServerError> {
    let req = body.into_inner();
    let user = api.verify(&req.email, &req.code).await?;
    let token = issuer.issue_token(user.id, user.role)?;
    Ok(HttpResponse::Ok().json(LoginResponse { token }))
}

#[post("/auth")]
pub async fn login(
    body: web::Json<LoginRequest>,
    api: Auth,
    issuer: web::Data<TokenIssuer>,
) -> Result<HttpResponse, ServerError> {
    let req = body.into_inner();
    let user = api.user_for_login(&req.email).await?;
    if !verify_password(&req.password, &user.password_hash) {
        return Err(AuthError::InvalidCredentials.into());
    }
    let token = issuer.issue_token(user.id, user.role)?;
    Ok(HttpResponse::Ok().json(LoginResponse { token }))
}

//--------------------------------------   Public catalog    ---------------------------------------------------------

#[get("/products")]
pub async fn list_products(query: web::Query<ProductListQuery>, api: Catalog) -> Result<HttpResponse, ServerError> {
    let (products, source) = api.products(query.into_inner().into_filter()).await?;
    Ok(HttpResponse::Ok().json(tagged(&products, source)))
}

#[get("/products/{id}")]
pub async fn get_product(path: web::Path<i64>, api: Catalog) -> Result<HttpResponse, ServerError> {
    let (product, source) = api.product(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(tagged(&product, source)))
}

#[get("/products/{id}/reviews")]
pub async fn product_reviews(path: web::Path<i64>, api: Catalog) -> Result<HttpResponse, ServerError> {
    let (reviews, source) = api.reviews_for_product(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(tagged(&reviews, source)))
}

//--------------------------------------       Orders        ---------------------------------------------------------

/// Start a checkout. A direct method places the order right away; a gateway method returns the
/// remote payment intent to pay against, with no order created yet. Both respond 201: either way
/// a new resource (order or remote intent) now exists.
#[post("/orders")]
pub async fn create_order(claims: Claims, body: web::Json<CreateOrderRequest>, api: Orders) -> Result<HttpResponse, ServerError> {
    let req = body.into_inner();
    let outcome = api.place_order(claims.user_id, req.address_id, &req.payment_method).await?;
    Ok(HttpResponse::Created().json(outcome))
}

#[post("/orders/verify-payment")]
pub async fn verify_payment(
    claims: Claims,
    body: web::Json<VerifyPaymentRequest>,
    api: Orders,
) -> Result<HttpResponse, ServerError> {
    let req = body.into_inner();
    let detail = api
        .verify_payment(claims.user_id, &req.gateway_order_id, &req.gateway_payment_id, &req.gateway_signature)
        .await?;
    Ok(HttpResponse::Ok().json(detail))
}

#[get("/orders")]
pub async fn list_orders(claims: Claims, query: web::Query<OrderListQuery>, api: Orders) -> Result<HttpResponse, ServerError> {
    let q = query.into_inner();
    let (orders, source) = api.orders_for_buyer(claims.user_id, q.status, q.pagination()).await?;
    Ok(HttpResponse::Ok().json(tagged(&orders, source)))
}

#[get("/orders/{id}")]
pub async fn get_order(claims: Claims, path: web::Path<String>, api: Orders) -> Result<HttpResponse, ServerError> {
    let order_id = OrderId::from(path.into_inner());
    let (detail, source) = api.order_by_id(&order_id, claims.user_id).await?;
    Ok(HttpResponse::Ok().json(tagged(&detail, source)))
}

/// A buyer cancelling their own order. Only `Pending` orders qualify; the items go back into
/// stock atomically with the status change.
#[put("/orders/{id}/cancel")]
pub async fn cancel_order(claims: Claims, path: web::Path<String>, api: Orders) -> Result<HttpResponse, ServerError> {
    let order_id = OrderId::from(path.into_inner());
    let order = api.cancel_order(&order_id, claims.user_id).await?;
    Ok(HttpResponse::Ok().json(order))
}

#[put("/orders/{id}/payment-status")]
pub async fn update_payment_status(
    claims: Claims,
    path: web::Path<String>,
    body: web::Json<UpdatePaymentStatusRequest>,
    api: Orders,
) -> Result<HttpResponse, ServerError> {
    claims.require(&[Role::Admin])?;
    let order_id = OrderId::from(path.into_inner());
    let req = body.into_inner();
    let order = api.update_payment_status(&order_id, req.payment_status, req.txid).await?;
    Ok(HttpResponse::Ok().json(order))
}

#[put("/orders/{id}/status")]
pub async fn update_order_status(
    claims: Claims,
    path: web::Path<String>,
    body: web::Json<UpdateOrderStatusRequest>,
    api: Orders,
) -> Result<HttpResponse, ServerError> {
    claims.require(&[Role::Artist, Role::Admin])?;
    let order_id = OrderId::from(path.into_inner());
    let order = api.advance_order_status(&order_id, body.into_inner().status).await?;
    Ok(HttpResponse::Ok().json(order))
}

//--------------------------------------        Cart         ---------------------------------------------------------

#[get("/cart")]
pub async fn get_cart(claims: Claims, api: Cart) -> Result<HttpResponse, ServerError> {
    let (items, source) = api.cart(claims.user_id).await?;
    Ok(HttpResponse::Ok().json(tagged(&items, source)))
}

#[post("/cart")]
pub async fn add_to_cart(claims: Claims, body: web::Json<CartAddRequest>, api: Cart) -> Result<HttpResponse, ServerError> {
    let req = body.into_inner();
    let line = api.add(claims.user_id, req.product_id, req.quantity).await?;
    Ok(HttpResponse::Ok().json(line))
}

#[put("/cart/{product_id}")]
pub async fn set_cart_quantity(
    claims: Claims,
    path: web::Path<i64>,
    body: web::Json<CartUpdateRequest>,
    api: Cart,
) -> Result<HttpResponse, ServerError> {
    match api.set_quantity(claims.user_id, path.into_inner(), body.into_inner().quantity).await? {
        Some(line) => Ok(HttpResponse::Ok().json(line)),
        None => Ok(HttpResponse::NoContent().finish()),
    }
}

#[delete("/cart/{product_id}")]
pub async fn remove_from_cart(claims: Claims, path: web::Path<i64>, api: Cart) -> Result<HttpResponse, ServerError> {
    api.remove(claims.user_id, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[delete("/cart")]
pub async fn clear_cart(claims: Claims, api: Cart) -> Result<HttpResponse, ServerError> {
    api.clear(claims.user_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

//--------------------------------------   Artist catalog    ---------------------------------------------------------

#[post("/products")]
pub async fn create_product(
    claims: Claims,
    body: web::Json<NewProductRequest>,
    api: Catalog,
) -> Result<HttpResponse, ServerError> {
    claims.require(&[Role::Artist])?;
    let req = body.into_inner();
    let product = NewProduct {
        artist_id: claims.user_id,
        name: req.name,
        description: req.description,
        price: req.price,
        stock: req.stock,
    };
    let product = api.create_product(product).await?;
    Ok(HttpResponse::Created().json(product))
}

#[put("/products/{id}")]
pub async fn update_product(
    claims: Claims,
    path: web::Path<i64>,
    body: web::Json<UpdateProduct>,
    api: Catalog,
) -> Result<HttpResponse, ServerError> {
    claims.require(&[Role::Artist])?;
    let product = api.update_product(path.into_inner(), claims.user_id, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(product))
}

#[delete("/products/{id}")]
pub async fn delete_product(claims: Claims, path: web::Path<i64>, api: Catalog) -> Result<HttpResponse, ServerError> {
    claims.require(&[Role::Artist])?;
    api.delete_product(path.into_inner(), claims.user_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

//--------------------------------------      Wishlist       ---------------------------------------------------------

#[get("/wishlist")]
pub async fn get_wishlist(claims: Claims, api: Catalog) -> Result<HttpResponse, ServerError> {
    let (items, source) = api.wishlist(claims.user_id).await?;
    Ok(HttpResponse::Ok().json(tagged(&items, source)))
}

#[post("/wishlist")]
pub async fn add_to_wishlist(
    claims: Claims,
    body: web::Json<WishlistAddRequest>,
    api: Catalog,
) -> Result<HttpResponse, ServerError> {
    api.add_to_wishlist(claims.user_id, body.into_inner().product_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[delete("/wishlist/{product_id}")]
pub async fn remove_from_wishlist(
    claims: Claims,
    path: web::Path<i64>,
    api: Catalog,
) -> Result<HttpResponse, ServerError> {
    api.remove_from_wishlist(claims.user_id, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

//--------------------------------------       Reviews       ---------------------------------------------------------

#[post("/reviews")]
pub async fn create_review(claims: Claims, body: web::Json<NewReview>, api: Catalog) -> Result<HttpResponse, ServerError> {
    let review = api.create_review(claims.user_id, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(review))
}

#[put("/reviews/{id}")]
pub async fn update_review(
    claims: Claims,
    path: web::Path<i64>,
    body: web::Json<ReviewUpdateRequest>,
    api: Catalog,
) -> Result<HttpResponse, ServerError> {
    let req = body.into_inner();
    let review = api.update_review(path.into_inner(), claims.user_id, req.rating, req.body).await?;
    Ok(HttpResponse::Ok().json(review))
}

#[delete("/reviews/{id}")]
pub async fn delete_review(claims: Claims, path: web::Path<i64>, api: Catalog) -> Result<HttpResponse, ServerError> {
    api.delete_review(path.into_inner(), claims.user_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

//--------------------------------------      Addresses      ---------------------------------------------------------

#[post("/addresses")]
pub async fn create_address(claims: Claims, body: web::Json<NewAddress>, api: Catalog) -> Result<HttpResponse, ServerError> {
    let address = api.create_address(claims.user_id, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(address))
}

#[get("/addresses")]
pub async fn list_addresses(claims: Claims, api: Catalog) -> Result<HttpResponse, ServerError> {
    let addresses = api.addresses(claims.user_id).await?;
    Ok(HttpResponse::Ok().json(addresses))
}
