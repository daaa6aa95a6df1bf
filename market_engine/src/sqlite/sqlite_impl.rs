//! `SqliteDatabase` is the concrete store-of-record backend.
//!
//! It implements all the database traits in the [`crate::traits`] module on top of a shared
//! connection pool. The pool is created once (see [`SqliteDatabase::new_with_url`]) and the handle
//! is cheaply cloneable; nothing here is a module-level singleton.
//!
//! Every write runs inside a transaction that is committed before the method returns. Without
//! that, a statement the driver stops stepping at its first row (`INSERT … RETURNING` read with
//! `fetch_one`) leaves SQLite's implicit transaction open until the connection is next used, and
//! the write stays invisible to the rest of the pool in the meantime.
use std::fmt::Debug;

use chrono::{DateTime, Utc};
use log::debug;
use sqlx::SqlitePool;

use super::db::{carts, is_unique_violation, new_pool, orders, products, reviews, users, wishlist};
use crate::{
    db_types::{
        Address,
        CartItem,
        CartLine,
        NewAddress,
        NewOrder,
        NewPendingSignup,
        NewProduct,
        NewReview,
        Order,
        OrderId,
        OrderItem,
        OrderStatus,
        PaymentStatus,
        PendingSignup,
        Product,
        Review,
        Role,
        UpdateProduct,
        User,
        WishlistItem,
    },
    order_objects::{OrderQueryFilter, ProductQueryFilter},
    pricing::PricedLine,
    traits::{
        AuthDbError,
        AuthManagement,
        CartDbError,
        CartManagement,
        CatalogDbError,
        CatalogManagement,
        OrderDbError,
        OrderManagement,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the pool. Called once at shutdown.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

impl OrderManagement for SqliteDatabase {
    async fn insert_full_order(&self, order: NewOrder, lines: &[PricedLine]) -> Result<Order, OrderDbError> {
        let mut tx = self.pool.begin().await?;
        let inserted = orders::insert_order(&order, &mut tx).await?;
        for line in lines {
            let decremented = products::decrement_stock(line.product_id, line.quantity, &mut tx).await?;
            if !decremented {
                let available = products::available_stock(line.product_id, &mut tx).await?;
                // Dropping the transaction rolls back the order row and any earlier decrements
                return Err(OrderDbError::InsufficientStock {
                    product_id: line.product_id,
                    wanted: line.quantity,
                    available,
                });
            }
            orders::insert_order_item(&inserted.order_id, line, &mut tx).await?;
        }
        carts::clear_cart(order.buyer_id, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Order {} persisted with {} items", inserted.order_id, lines.len());
        Ok(inserted)
    }

    async fn fetch_order(&self, order_id: &OrderId) -> Result<Option<Order>, OrderDbError> {
        let mut conn = self.pool.acquire().await?;
        Ok(orders::fetch_order(order_id, &mut conn).await?)
    }

    async fn fetch_order_items(&self, order_id: &OrderId) -> Result<Vec<OrderItem>, OrderDbError> {
        let mut conn = self.pool.acquire().await?;
        Ok(orders::fetch_order_items(order_id, &mut conn).await?)
    }

    async fn search_orders(&self, filter: OrderQueryFilter) -> Result<Vec<Order>, OrderDbError> {
        let mut conn = self.pool.acquire().await?;
        Ok(orders::search_orders(filter, &mut conn).await?)
    }

    async fn cancel_order(&self, order_id: &OrderId, buyer_id: i64) -> Result<Order, OrderDbError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::fetch_order(order_id, &mut tx)
            .await?
            .filter(|o| o.buyer_id == buyer_id)
            .ok_or_else(|| OrderDbError::OrderNotFound(order_id.clone()))?;
        if order.status != OrderStatus::Pending {
            return Err(OrderDbError::NotCancellable(order_id.clone(), order.status));
        }
        let items = orders::fetch_order_items(order_id, &mut tx).await?;
        for item in &items {
            products::restore_stock(item.product_id, item.quantity, &mut tx).await?;
        }
        let cancelled = orders::update_order_status(order_id, OrderStatus::Cancelled, &mut tx)
            .await?
            .ok_or_else(|| OrderDbError::OrderNotFound(order_id.clone()))?;
        tx.commit().await?;
        debug!("🗃️ Order {order_id} cancelled, stock restored for {} items", items.len());
        Ok(cancelled)
    }

    async fn update_payment_status(
        &self,
        order_id: &OrderId,
        new_status: PaymentStatus,
        txid: Option<String>,
    ) -> Result<Order, OrderDbError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::fetch_order(order_id, &mut tx)
            .await?
            .ok_or_else(|| OrderDbError::OrderNotFound(order_id.clone()))?;
        if !order.payment_status.can_transition_to(new_status) {
            return Err(OrderDbError::PaymentTransitionForbidden(order.payment_status, new_status));
        }
        let updated = orders::update_payment_status(order_id, new_status, txid.as_deref(), &mut tx)
            .await?
            .ok_or_else(|| OrderDbError::OrderNotFound(order_id.clone()))?;
        tx.commit().await?;
        Ok(updated)
    }

    async fn advance_order_status(&self, order_id: &OrderId, new_status: OrderStatus) -> Result<Order, OrderDbError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::fetch_order(order_id, &mut tx)
            .await?
            .ok_or_else(|| OrderDbError::OrderNotFound(order_id.clone()))?;
        if !order.status.can_advance_to(new_status) {
            return Err(OrderDbError::StatusTransitionForbidden(order.status, new_status));
        }
        let updated = orders::update_order_status(order_id, new_status, &mut tx)
            .await?
            .ok_or_else(|| OrderDbError::OrderNotFound(order_id.clone()))?;
        tx.commit().await?;
        Ok(updated)
    }
}

impl CartManagement for SqliteDatabase {
    async fn add_to_cart(&self, buyer_id: i64, product_id: i64, quantity: i64) -> Result<CartLine, CartDbError> {
        if quantity <= 0 {
            return Err(CartDbError::InvalidQuantity);
        }
        let mut tx = self.pool.begin().await?;
        if products::fetch_product(product_id, &mut tx).await?.is_none() {
            return Err(CartDbError::ProductNotFound(product_id));
        }
        let line = carts::add_to_cart(buyer_id, product_id, quantity, &mut tx).await?;
        tx.commit().await?;
        Ok(line)
    }

    async fn set_cart_quantity(
        &self,
        buyer_id: i64,
        product_id: i64,
        quantity: i64,
    ) -> Result<Option<CartLine>, CartDbError> {
        if quantity < 0 {
            return Err(CartDbError::InvalidQuantity);
        }
        let mut tx = self.pool.begin().await?;
        let line = if quantity == 0 {
            carts::remove_line(buyer_id, product_id, &mut tx).await?;
            None
        } else {
            carts::set_quantity(buyer_id, product_id, quantity, &mut tx).await?
        };
        tx.commit().await?;
        Ok(line)
    }

    async fn remove_from_cart(&self, buyer_id: i64, product_id: i64) -> Result<(), CartDbError> {
        let mut tx = self.pool.begin().await?;
        carts::remove_line(buyer_id, product_id, &mut tx).await?;
        Ok(tx.commit().await?)
    }

    async fn clear_cart(&self, buyer_id: i64) -> Result<(), CartDbError> {
        let mut tx = self.pool.begin().await?;
        carts::clear_cart(buyer_id, &mut tx).await?;
        Ok(tx.commit().await?)
    }

    async fn fetch_cart(&self, buyer_id: i64) -> Result<Vec<CartItem>, CartDbError> {
        let mut conn = self.pool.acquire().await?;
        Ok(carts::fetch_cart(buyer_id, &mut conn).await?)
    }
}

impl CatalogManagement for SqliteDatabase {
    async fn insert_product(&self, product: NewProduct) -> Result<Product, CatalogDbError> {
        let mut tx = self.pool.begin().await?;
        let product = products::insert_product(&product, &mut tx).await?;
        tx.commit().await?;
        Ok(product)
    }

    async fn update_product(
        &self,
        product_id: i64,
        artist_id: i64,
        update: UpdateProduct,
    ) -> Result<Option<Product>, CatalogDbError> {
        if update.is_empty() {
            return Err(CatalogDbError::EmptyUpdate);
        }
        let mut tx = self.pool.begin().await?;
        let product = products::update_product(product_id, artist_id, update, &mut tx).await?;
        tx.commit().await?;
        Ok(product)
    }

    async fn delete_product(&self, product_id: i64, artist_id: i64) -> Result<bool, CatalogDbError> {
        let mut tx = self.pool.begin().await?;
        let deleted = products::delete_product(product_id, artist_id, &mut tx).await?;
        tx.commit().await?;
        Ok(deleted)
    }

    async fn fetch_product(&self, product_id: i64) -> Result<Option<Product>, CatalogDbError> {
        let mut conn = self.pool.acquire().await?;
        Ok(products::fetch_product(product_id, &mut conn).await?)
    }

    async fn search_products(&self, filter: ProductQueryFilter) -> Result<Vec<Product>, CatalogDbError> {
        let mut conn = self.pool.acquire().await?;
        Ok(products::search_products(filter, &mut conn).await?)
    }

    async fn add_to_wishlist(&self, buyer_id: i64, product_id: i64) -> Result<(), CatalogDbError> {
        let mut tx = self.pool.begin().await?;
        if products::fetch_product(product_id, &mut tx).await?.is_none() {
            return Err(CatalogDbError::ProductNotFound(product_id));
        }
        wishlist::add_to_wishlist(buyer_id, product_id, &mut tx).await?;
        Ok(tx.commit().await?)
    }

    async fn remove_from_wishlist(&self, buyer_id: i64, product_id: i64) -> Result<(), CatalogDbError> {
        let mut tx = self.pool.begin().await?;
        wishlist::remove_from_wishlist(buyer_id, product_id, &mut tx).await?;
        Ok(tx.commit().await?)
    }

    async fn fetch_wishlist(&self, buyer_id: i64) -> Result<Vec<WishlistItem>, CatalogDbError> {
        let mut conn = self.pool.acquire().await?;
        Ok(wishlist::fetch_wishlist(buyer_id, &mut conn).await?)
    }

    async fn insert_review(&self, buyer_id: i64, review: NewReview) -> Result<Review, CatalogDbError> {
        if !(1..=5).contains(&review.rating) {
            return Err(CatalogDbError::InvalidRating);
        }
        let mut tx = self.pool.begin().await?;
        if products::fetch_product(review.product_id, &mut tx).await?.is_none() {
            return Err(CatalogDbError::ProductNotFound(review.product_id));
        }
        let review = reviews::insert_review(buyer_id, &review, &mut tx).await.map_err(|e| {
            if is_unique_violation(&e) {
                CatalogDbError::DuplicateReview
            } else {
                CatalogDbError::DatabaseError(e)
            }
        })?;
        tx.commit().await?;
        Ok(review)
    }

    async fn update_review(
        &self,
        review_id: i64,
        buyer_id: i64,
        rating: i64,
        body: String,
    ) -> Result<Option<Review>, CatalogDbError> {
        if !(1..=5).contains(&rating) {
            return Err(CatalogDbError::InvalidRating);
        }
        let mut tx = self.pool.begin().await?;
        let review = reviews::update_review(review_id, buyer_id, rating, &body, &mut tx).await?;
        tx.commit().await?;
        Ok(review)
    }

    async fn delete_review(&self, review_id: i64, buyer_id: i64) -> Result<bool, CatalogDbError> {
        let mut tx = self.pool.begin().await?;
        let deleted = reviews::delete_review(review_id, buyer_id, &mut tx).await?;
        tx.commit().await?;
        Ok(deleted)
    }

    async fn fetch_review(&self, review_id: i64) -> Result<Option<Review>, CatalogDbError> {
        let mut conn = self.pool.acquire().await?;
        Ok(reviews::fetch_review(review_id, &mut conn).await?)
    }

    async fn fetch_reviews_for_product(&self, product_id: i64) -> Result<Vec<Review>, CatalogDbError> {
        let mut conn = self.pool.acquire().await?;
        Ok(reviews::fetch_reviews_for_product(product_id, &mut conn).await?)
    }

    async fn insert_address(&self, buyer_id: i64, address: NewAddress) -> Result<Address, CatalogDbError> {
        let mut tx = self.pool.begin().await?;
        let address = users::insert_address(buyer_id, &address, &mut tx).await?;
        tx.commit().await?;
        Ok(address)
    }

    async fn fetch_address_for_buyer(
        &self,
        address_id: i64,
        buyer_id: i64,
    ) -> Result<Option<Address>, CatalogDbError> {
        let mut conn = self.pool.acquire().await?;
        Ok(users::fetch_address_for_buyer(address_id, buyer_id, &mut conn).await?)
    }

    async fn fetch_addresses(&self, buyer_id: i64) -> Result<Vec<Address>, CatalogDbError> {
        let mut conn = self.pool.acquire().await?;
        Ok(users::fetch_addresses(buyer_id, &mut conn).await?)
    }
}

impl AuthManagement for SqliteDatabase {
    async fn upsert_pending_signup(&self, signup: NewPendingSignup) -> Result<PendingSignup, AuthDbError> {
        let mut tx = self.pool.begin().await?;
        if users::fetch_user_by_email(&signup.email, &mut tx).await?.is_some() {
            return Err(AuthDbError::EmailTaken);
        }
        let pending = users::upsert_pending_signup(&signup, &mut tx).await?;
        tx.commit().await?;
        Ok(pending)
    }

    async fn verify_signup(&self, email: &str, code: &str, now: DateTime<Utc>) -> Result<User, AuthDbError> {
        let mut tx = self.pool.begin().await?;
        let pending =
            users::fetch_pending_signup(email, &mut tx).await?.ok_or(AuthDbError::SignupNotFound)?;
        if pending.verification_code != code || pending.expires_at <= now {
            return Err(AuthDbError::InvalidVerification);
        }
        let user =
            users::insert_user(&pending.email, &pending.display_name, &pending.password_hash, Role::Buyer, &mut tx)
                .await
                .map_err(|e| if is_unique_violation(&e) { AuthDbError::EmailTaken } else { e.into() })?;
        users::delete_pending_signup(email, &mut tx).await?;
        tx.commit().await?;
        Ok(user)
    }

    async fn purge_expired_signups(&self, now: DateTime<Utc>) -> Result<u64, AuthDbError> {
        let mut tx = self.pool.begin().await?;
        let purged = users::purge_expired_signups(now, &mut tx).await?;
        tx.commit().await?;
        Ok(purged)
    }

    async fn fetch_user_by_email(&self, email: &str) -> Result<Option<User>, AuthDbError> {
        let mut conn = self.pool.acquire().await?;
        Ok(users::fetch_user_by_email(email, &mut conn).await?)
    }

    async fn fetch_user(&self, user_id: i64) -> Result<Option<User>, AuthDbError> {
        let mut conn = self.pool.acquire().await?;
        Ok(users::fetch_user(user_id, &mut conn).await?)
    }
}
