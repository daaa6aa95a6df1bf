use market_common::Money;
use serde::{Deserialize, Serialize};

use crate::db_types::{Order, OrderItem, OrderStatus};

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

/// 1-based pagination parameters, as supplied by clients. Out-of-range values are clamped rather
/// than rejected.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Pagination {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl Pagination {
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> u32 {
        (self.page() - 1) * self.limit()
    }

    pub fn cache_suffix(&self) -> String {
        format!("page:{}:limit:{}", self.page(), self.limit())
    }
}

#[derive(Debug, Clone, Default)]
pub struct OrderQueryFilter {
    pub buyer_id: Option<i64>,
    pub status: Option<OrderStatus>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Default)]
pub struct ProductQueryFilter {
    pub artist_id: Option<i64>,
    pub search: Option<String>,
    pub pagination: Pagination,
}

/// An order together with its immutable item snapshots. This is the shape that gets cached and
/// returned from detail reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetail {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Result of a checkout request. A direct payment method produces a placed order immediately; a
/// gateway method produces a remote intent the client must pay and verify before any order exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CheckoutOutcome {
    Placed { order: OrderDetail },
    PaymentRequired { gateway_order_id: String, amount: Money, currency: String },
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn pagination_defaults() {
        let p = Pagination::default();
        assert_eq!(p.page(), 1);
        assert_eq!(p.limit(), DEFAULT_PAGE_SIZE);
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn pagination_clamps_out_of_range_values() {
        let p = Pagination { page: Some(0), limit: Some(10_000) };
        assert_eq!(p.page(), 1);
        assert_eq!(p.limit(), MAX_PAGE_SIZE);
        let p = Pagination { page: Some(3), limit: Some(25) };
        assert_eq!(p.offset(), 50);
    }

    #[test]
    fn cache_suffix_distinguishes_pages() {
        let a = Pagination { page: Some(1), limit: Some(20) };
        let b = Pagination { page: Some(2), limit: Some(20) };
        assert_ne!(a.cache_suffix(), b.cache_suffix());
    }
}
