use thiserror::Error;

use crate::{
    db_types::{NewOrder, Order, OrderId, OrderItem, OrderStatus, PaymentStatus},
    order_objects::OrderQueryFilter,
    pricing::PricedLine,
};

#[derive(Debug, Error)]
pub enum OrderDbError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
    #[error("Order {0} does not exist")]
    OrderNotFound(OrderId),
    #[error("Insufficient stock for product {product_id}: wanted {wanted}, {available} available")]
    InsufficientStock { product_id: i64, wanted: i64, available: i64 },
    #[error("Order {0} cannot be cancelled from status {1}")]
    NotCancellable(OrderId, OrderStatus),
    #[error("Order status may not move from {0} to {1}")]
    StatusTransitionForbidden(OrderStatus, OrderStatus),
    #[error("Payment status may not move from {0} to {1}")]
    PaymentTransitionForbidden(PaymentStatus, PaymentStatus),
}

/// Order persistence and status transitions.
///
/// The compound operations are atomic: either every row they touch is written, or none are.
#[allow(async_fn_in_trait)]
pub trait OrderManagement: Clone {
    /// In a single transaction: insert the order row, snapshot one order item per priced line,
    /// decrement each product's stock (rejecting with [`OrderDbError::InsufficientStock`] if any
    /// line cannot be satisfied), and clear the buyer's cart. The cart is only cleared when the
    /// order commits.
    async fn insert_full_order(&self, order: NewOrder, lines: &[PricedLine]) -> Result<Order, OrderDbError>;

    async fn fetch_order(&self, order_id: &OrderId) -> Result<Option<Order>, OrderDbError>;

    async fn fetch_order_items(&self, order_id: &OrderId) -> Result<Vec<OrderItem>, OrderDbError>;

    /// Orders matching the filter, newest first, paginated.
    async fn search_orders(&self, filter: OrderQueryFilter) -> Result<Vec<Order>, OrderDbError>;

    /// Cancel a `Pending` order owned by `buyer_id` and restore each item's quantity to product
    /// stock, atomically. Any other current status is rejected.
    async fn cancel_order(&self, order_id: &OrderId, buyer_id: i64) -> Result<Order, OrderDbError>;

    /// Apply a payment-status transition, enforcing the allowed graph
    /// (`Unpaid → Paid | Failed`, `Failed → Paid`; `Paid` is terminal).
    async fn update_payment_status(
        &self,
        order_id: &OrderId,
        new_status: PaymentStatus,
        txid: Option<String>,
    ) -> Result<Order, OrderDbError>;

    /// Move fulfilment one step forward (`Pending → Confirmed → Shipped → Delivered`).
    async fn advance_order_status(&self, order_id: &OrderId, new_status: OrderStatus) -> Result<Order, OrderDbError>;
}
