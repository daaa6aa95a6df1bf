use thiserror::Error;

use crate::{
    db_types::{Address, NewAddress, NewProduct, NewReview, Product, Review, UpdateProduct, WishlistItem},
    order_objects::ProductQueryFilter,
};

#[derive(Debug, Error)]
pub enum CatalogDbError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
    #[error("Product {0} does not exist")]
    ProductNotFound(i64),
    #[error("Review {0} does not exist")]
    ReviewNotFound(i64),
    #[error("A review for this product already exists")]
    DuplicateReview,
    #[error("Rating must be between 1 and 5")]
    InvalidRating,
    #[error("No fields to update")]
    EmptyUpdate,
}

/// Product, wishlist, review and address persistence.
///
/// Ownership is enforced at this level by scoping every mutation to the owner's id in the WHERE
/// clause; a mutation against someone else's resource reads as "not found" rather than revealing
/// that the resource exists.
#[allow(async_fn_in_trait)]
pub trait CatalogManagement: Clone {
    async fn insert_product(&self, product: NewProduct) -> Result<Product, CatalogDbError>;

    async fn update_product(
        &self,
        product_id: i64,
        artist_id: i64,
        update: UpdateProduct,
    ) -> Result<Option<Product>, CatalogDbError>;

    async fn delete_product(&self, product_id: i64, artist_id: i64) -> Result<bool, CatalogDbError>;

    async fn fetch_product(&self, product_id: i64) -> Result<Option<Product>, CatalogDbError>;

    async fn search_products(&self, filter: ProductQueryFilter) -> Result<Vec<Product>, CatalogDbError>;

    /// Idempotent: adding a product already on the wishlist is a no-op.
    async fn add_to_wishlist(&self, buyer_id: i64, product_id: i64) -> Result<(), CatalogDbError>;

    async fn remove_from_wishlist(&self, buyer_id: i64, product_id: i64) -> Result<(), CatalogDbError>;

    async fn fetch_wishlist(&self, buyer_id: i64) -> Result<Vec<WishlistItem>, CatalogDbError>;

    /// One review per (buyer, product); a second insert reports [`CatalogDbError::DuplicateReview`].
    async fn insert_review(&self, buyer_id: i64, review: NewReview) -> Result<Review, CatalogDbError>;

    async fn update_review(
        &self,
        review_id: i64,
        buyer_id: i64,
        rating: i64,
        body: String,
    ) -> Result<Option<Review>, CatalogDbError>;

    async fn delete_review(&self, review_id: i64, buyer_id: i64) -> Result<bool, CatalogDbError>;

    async fn fetch_review(&self, review_id: i64) -> Result<Option<Review>, CatalogDbError>;

    async fn fetch_reviews_for_product(&self, product_id: i64) -> Result<Vec<Review>, CatalogDbError>;

    async fn insert_address(&self, buyer_id: i64, address: NewAddress) -> Result<Address, CatalogDbError>;

    /// `None` both when the address does not exist and when it belongs to someone else.
    async fn fetch_address_for_buyer(&self, address_id: i64, buyer_id: i64)
        -> Result<Option<Address>, CatalogDbError>;

    async fn fetch_addresses(&self, buyer_id: i64) -> Result<Vec<Address>, CatalogDbError>;
}
