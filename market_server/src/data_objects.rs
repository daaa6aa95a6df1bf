//! Request and response payloads for the HTTP surface.

use market_common::Money;
use market_engine::{
    cache::CacheSource,
    db_types::{OrderStatus, PaymentStatus},
    order_objects::{Pagination, ProductQueryFilter},
};
use serde::{Deserialize, Serialize};
use serde_json::json;

//--------------------------------------        Auth         ---------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub display_name: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerifyRequest {
    pub email: String,
    pub code: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

//--------------------------------------       Orders        ---------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderRequest {
    pub address_id: i64,
    pub payment_method: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerifyPaymentRequest {
    pub gateway_order_id: String,
    pub gateway_payment_id: String,
    pub gateway_signature: String,
}

/// Query-string parameters are kept flat: `serde_urlencoded` cannot drive `#[serde(flatten)]`
/// through non-string types.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderListQuery {
    pub status: Option<OrderStatus>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl OrderListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination { page: self.page, limit: self.limit }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductListQuery {
    pub artist_id: Option<i64>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl ProductListQuery {
    pub fn into_filter(self) -> ProductQueryFilter {
        ProductQueryFilter {
            artist_id: self.artist_id,
            search: self.search,
            pagination: Pagination { page: self.page, limit: self.limit },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePaymentStatusRequest {
    pub payment_status: PaymentStatus,
    pub txid: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

//--------------------------------------        Cart         ---------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct CartAddRequest {
    pub product_id: i64,
    pub quantity: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CartUpdateRequest {
    pub quantity: i64,
}

//--------------------------------------       Catalog       ---------------------------------------------------------

/// Product creation payload. The artist id comes from the access token, never from the body.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProductRequest {
    pub name: String,
    pub description: String,
    pub price: Money,
    pub stock: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WishlistAddRequest {
    pub product_id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReviewUpdateRequest {
    pub rating: i64,
    pub body: String,
}

//--------------------------------------      Responses      ---------------------------------------------------------

/// Wrap a cached read so clients can see whether it was served from the cache or the database.
pub fn tagged<T: Serialize>(value: &T, source: CacheSource) -> serde_json::Value {
    json!({ "data": value, "source": source })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn tagged_reads_carry_their_source() {
        let v = tagged(&vec![1, 2, 3], CacheSource::Cache);
        assert_eq!(v["source"], "cache");
        assert_eq!(v["data"], json!([1, 2, 3]));
    }

    #[test]
    fn order_list_query_parses_from_a_query_string() {
        let q: OrderListQuery = serde_urlencoded::from_str("page=2&limit=5&status=Pending").unwrap();
        assert_eq!(q.pagination().page(), 2);
        assert_eq!(q.pagination().limit(), 5);
        assert_eq!(q.status, Some(OrderStatus::Pending));
    }
}
