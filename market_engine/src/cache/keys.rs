//! The single registry of cache keys and scopes.
//!
//! Detail keys name exactly one entity and are deleted precisely after a write. Collection views
//! (lists, pages, filters) live under a *scope*: the full key embeds the scope's version counter,
//! and writers bump the counter instead of trying to enumerate every filter/page variant that was
//! ever cached. Old keys simply become unreachable and expire.

use crate::{
    db_types::{OrderId, OrderStatus},
    order_objects::{Pagination, ProductQueryFilter},
};

pub fn orders_scope(buyer_id: i64) -> String {
    format!("buyer_orders:{buyer_id}")
}

/// Suffix for one page of a buyer's order list. The status filter is part of the key so filtered
/// and unfiltered views never collide.
pub fn orders_list_suffix(pagination: &Pagination, status: Option<OrderStatus>) -> String {
    let status = status.map(|s| s.to_string()).unwrap_or_else(|| "any".to_string());
    format!("{}:status:{status}", pagination.cache_suffix())
}

pub fn order_detail_key(order_id: &OrderId) -> String {
    format!("order:{}", order_id.as_str())
}

pub fn cart_key(buyer_id: i64) -> String {
    format!("cart:{buyer_id}")
}

pub fn products_scope() -> String {
    "products".to_string()
}

pub fn product_detail_key(product_id: i64) -> String {
    format!("product:{product_id}")
}

pub fn wishlist_key(buyer_id: i64) -> String {
    format!("wishlist:{buyer_id}")
}

pub fn reviews_scope(product_id: i64) -> String {
    format!("product_reviews:{product_id}")
}

pub fn products_list_suffix(filter: &ProductQueryFilter) -> String {
    let artist = filter.artist_id.map(|id| id.to_string()).unwrap_or_else(|| "any".to_string());
    let search = filter.search.as_deref().unwrap_or("");
    format!("{}:artist:{artist}:q:{search}", filter.pagination.cache_suffix())
}
