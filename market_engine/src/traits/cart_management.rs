use thiserror::Error;

use crate::db_types::{CartItem, CartLine};

#[derive(Debug, Error)]
pub enum CartDbError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
    #[error("Product {0} does not exist")]
    ProductNotFound(i64),
    #[error("Quantity must be positive")]
    InvalidQuantity,
}

#[allow(async_fn_in_trait)]
pub trait CartManagement: Clone {
    /// Add `quantity` of a product to the buyer's cart. Must be a single atomic
    /// upsert-with-increment at the store level so concurrent adds cannot lose updates.
    async fn add_to_cart(&self, buyer_id: i64, product_id: i64, quantity: i64) -> Result<CartLine, CartDbError>;

    /// Replace the quantity on an existing line. A quantity of zero removes the line.
    async fn set_cart_quantity(&self, buyer_id: i64, product_id: i64, quantity: i64)
        -> Result<Option<CartLine>, CartDbError>;

    async fn remove_from_cart(&self, buyer_id: i64, product_id: i64) -> Result<(), CartDbError>;

    async fn clear_cart(&self, buyer_id: i64) -> Result<(), CartDbError>;

    /// The buyer's cart joined with live product data (current price, artist, remaining stock).
    async fn fetch_cart(&self, buyer_id: i64) -> Result<Vec<CartItem>, CartDbError>;
}
