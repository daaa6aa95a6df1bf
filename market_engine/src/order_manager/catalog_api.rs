//! Products, wishlists, reviews and addresses.
//!
//! Reads on the public catalog go through the cache; every mutation invalidates exactly the keys
//! it can affect (precise delete for detail keys, a scope bump for list views). Mutations are
//! owner-scoped at the database layer, so a foreign product or review reads as not found here.

use std::fmt::Debug;

use crate::{
    cache::{keys, CacheSource, MarketCache, DEFAULT_CACHE_TTL},
    db_types::{Address, NewAddress, NewProduct, NewReview, Product, Review, UpdateProduct, WishlistItem},
    order_manager::{errors::CatalogApiError, order_objects::ProductQueryFilter},
    traits::{CatalogDbError, CatalogManagement},
};

pub struct CatalogApi<B> {
    db: B,
    cache: MarketCache,
}

impl<B> Debug for CatalogApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CatalogApi")
    }
}

impl<B> CatalogApi<B>
where B: CatalogManagement
{
    pub fn new(db: B, cache: MarketCache) -> Self {
        Self { db, cache }
    }

    //--------------------------------------      Products      ---------------------------------------------------

    pub async fn create_product(&self, product: NewProduct) -> Result<Product, CatalogApiError> {
        let product = self.db.insert_product(product).await?;
        self.cache.bump(&keys::products_scope()).await;
        Ok(product)
    }

    pub async fn update_product(
        &self,
        product_id: i64,
        artist_id: i64,
        update: UpdateProduct,
    ) -> Result<Product, CatalogApiError> {
        let product = self
            .db
            .update_product(product_id, artist_id, update)
            .await?
            .ok_or(CatalogDbError::ProductNotFound(product_id))?;
        self.cache.delete(&keys::product_detail_key(product_id)).await;
        self.cache.bump(&keys::products_scope()).await;
        Ok(product)
    }

    pub async fn delete_product(&self, product_id: i64, artist_id: i64) -> Result<(), CatalogApiError> {
        let deleted = self.db.delete_product(product_id, artist_id).await?;
        if !deleted {
            return Err(CatalogDbError::ProductNotFound(product_id).into());
        }
        self.cache.delete(&keys::product_detail_key(product_id)).await;
        self.cache.bump(&keys::products_scope()).await;
        Ok(())
    }

    pub async fn product(&self, product_id: i64) -> Result<(Product, CacheSource), CatalogApiError> {
        let db = self.db.clone();
        self.cache
            .get_or_set(&keys::product_detail_key(product_id), DEFAULT_CACHE_TTL, || async move {
                db.fetch_product(product_id)
                    .await?
                    .ok_or(CatalogApiError::Database(CatalogDbError::ProductNotFound(product_id)))
            })
            .await
    }

    pub async fn products(&self, filter: ProductQueryFilter) -> Result<(Vec<Product>, CacheSource), CatalogApiError> {
        let key = self
            .cache
            .scoped_key(&keys::products_scope(), &keys::products_list_suffix(&filter))
            .await;
        let db = self.db.clone();
        self.cache
            .get_or_set(&key, DEFAULT_CACHE_TTL, || async move {
                db.search_products(filter).await.map_err(CatalogApiError::from)
            })
            .await
    }

    //--------------------------------------      Wishlist      ---------------------------------------------------

    pub async fn add_to_wishlist(&self, buyer_id: i64, product_id: i64) -> Result<(), CatalogApiError> {
        self.db.add_to_wishlist(buyer_id, product_id).await?;
        self.cache.delete(&keys::wishlist_key(buyer_id)).await;
        Ok(())
    }

    pub async fn remove_from_wishlist(&self, buyer_id: i64, product_id: i64) -> Result<(), CatalogApiError> {
        self.db.remove_from_wishlist(buyer_id, product_id).await?;
        self.cache.delete(&keys::wishlist_key(buyer_id)).await;
        Ok(())
    }

    pub async fn wishlist(&self, buyer_id: i64) -> Result<(Vec<WishlistItem>, CacheSource), CatalogApiError> {
        let db = self.db.clone();
        self.cache
            .get_or_set(&keys::wishlist_key(buyer_id), DEFAULT_CACHE_TTL, || async move {
                db.fetch_wishlist(buyer_id).await.map_err(CatalogApiError::from)
            })
            .await
    }

    //--------------------------------------      Reviews       ---------------------------------------------------

    pub async fn create_review(&self, buyer_id: i64, review: NewReview) -> Result<Review, CatalogApiError> {
        let product_id = review.product_id;
        let review = self.db.insert_review(buyer_id, review).await?;
        self.cache.bump(&keys::reviews_scope(product_id)).await;
        Ok(review)
    }

    pub async fn update_review(
        &self,
        review_id: i64,
        buyer_id: i64,
        rating: i64,
        body: String,
    ) -> Result<Review, CatalogApiError> {
        let review = self
            .db
            .update_review(review_id, buyer_id, rating, body)
            .await?
            .ok_or(CatalogDbError::ReviewNotFound(review_id))?;
        self.cache.bump(&keys::reviews_scope(review.product_id)).await;
        Ok(review)
    }

    pub async fn delete_review(&self, review_id: i64, buyer_id: i64) -> Result<(), CatalogApiError> {
        let review = self
            .db
            .fetch_review(review_id)
            .await?
            .filter(|r| r.buyer_id == buyer_id)
            .ok_or(CatalogDbError::ReviewNotFound(review_id))?;
        self.db.delete_review(review_id, buyer_id).await?;
        self.cache.bump(&keys::reviews_scope(review.product_id)).await;
        Ok(())
    }

    pub async fn reviews_for_product(&self, product_id: i64) -> Result<(Vec<Review>, CacheSource), CatalogApiError> {
        let key = self.cache.scoped_key(&keys::reviews_scope(product_id), "all").await;
        let db = self.db.clone();
        self.cache
            .get_or_set(&key, DEFAULT_CACHE_TTL, || async move {
                db.fetch_reviews_for_product(product_id).await.map_err(CatalogApiError::from)
            })
            .await
    }

    //--------------------------------------      Addresses     ---------------------------------------------------

    pub async fn create_address(&self, buyer_id: i64, address: NewAddress) -> Result<Address, CatalogApiError> {
        Ok(self.db.insert_address(buyer_id, address).await?)
    }

    pub async fn addresses(&self, buyer_id: i64) -> Result<Vec<Address>, CatalogApiError> {
        Ok(self.db.fetch_addresses(buyer_id).await?)
    }
}
