use std::fmt::Debug;

use crate::{
    cache::{keys, CacheSource, MarketCache, DEFAULT_CACHE_TTL},
    db_types::{CartItem, CartLine},
    order_manager::errors::CartApiError,
    traits::CartManagement,
};

pub struct CartApi<B> {
    db: B,
    cache: MarketCache,
}

impl<B> Debug for CartApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CartApi")
    }
}

impl<B> CartApi<B>
where B: CartManagement
{
    pub fn new(db: B, cache: MarketCache) -> Self {
        Self { db, cache }
    }

    /// Merge-add: quantities accumulate when the product is already in the cart. The store does
    /// the merge in one atomic upsert, so concurrent adds cannot lose an update.
    pub async fn add(&self, buyer_id: i64, product_id: i64, quantity: i64) -> Result<CartLine, CartApiError> {
        let line = self.db.add_to_cart(buyer_id, product_id, quantity).await?;
        self.cache.delete(&keys::cart_key(buyer_id)).await;
        Ok(line)
    }

    /// Replace a line's quantity. Zero removes the line; `None` is returned in that case.
    pub async fn set_quantity(
        &self,
        buyer_id: i64,
        product_id: i64,
        quantity: i64,
    ) -> Result<Option<CartLine>, CartApiError> {
        let line = self.db.set_cart_quantity(buyer_id, product_id, quantity).await?;
        self.cache.delete(&keys::cart_key(buyer_id)).await;
        Ok(line)
    }

    pub async fn remove(&self, buyer_id: i64, product_id: i64) -> Result<(), CartApiError> {
        self.db.remove_from_cart(buyer_id, product_id).await?;
        self.cache.delete(&keys::cart_key(buyer_id)).await;
        Ok(())
    }

    pub async fn clear(&self, buyer_id: i64) -> Result<(), CartApiError> {
        self.db.clear_cart(buyer_id).await?;
        self.cache.delete(&keys::cart_key(buyer_id)).await;
        Ok(())
    }

    /// The cart with live product data, read through the cache.
    pub async fn cart(&self, buyer_id: i64) -> Result<(Vec<CartItem>, CacheSource), CartApiError> {
        let db = self.db.clone();
        let (items, source) = self
            .cache
            .get_or_set(&keys::cart_key(buyer_id), DEFAULT_CACHE_TTL, || async move {
                db.fetch_cart(buyer_id).await.map_err(CartApiError::from)
            })
            .await?;
        Ok((items, source))
    }
}
