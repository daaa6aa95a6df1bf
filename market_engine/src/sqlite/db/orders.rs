use log::trace;
use sqlx::{QueryBuilder, SqliteConnection};

use crate::{
    db_types::{NewOrder, Order, OrderId, OrderItem, OrderStatus, PaymentStatus},
    order_objects::OrderQueryFilter,
    pricing::PricedLine,
};

pub async fn insert_order(order: &NewOrder, conn: &mut SqliteConnection) -> Result<Order, sqlx::Error> {
    sqlx::query_as(
        r#"
            INSERT INTO orders (
                order_id,
                buyer_id,
                total,
                status,
                payment_method,
                payment_status,
                payment_txid,
                address_id
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *;
        "#,
    )
    .bind(&order.order_id)
    .bind(order.buyer_id)
    .bind(order.total)
    .bind(OrderStatus::Pending)
    .bind(&order.payment_method)
    .bind(order.payment_status)
    .bind(&order.payment_txid)
    .bind(order.address_id)
    .fetch_one(conn)
    .await
}

/// Snapshots one priced cart line as an order item. The unit price stored here never changes,
/// regardless of later product price edits.
pub async fn insert_order_item(
    order_id: &OrderId,
    line: &PricedLine,
    conn: &mut SqliteConnection,
) -> Result<OrderItem, sqlx::Error> {
    sqlx::query_as(
        r#"
            INSERT INTO order_items (order_id, product_id, artist_id, quantity, unit_price)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *;
        "#,
    )
    .bind(order_id)
    .bind(line.product_id)
    .bind(line.artist_id)
    .bind(line.quantity)
    .bind(line.unit_price)
    .fetch_one(conn)
    .await
}

pub async fn fetch_order(order_id: &OrderId, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM orders WHERE order_id = $1").bind(order_id.as_str()).fetch_optional(conn).await
}

pub async fn fetch_order_items(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Vec<OrderItem>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM order_items WHERE order_id = $1 ORDER BY id ASC")
        .bind(order_id.as_str())
        .fetch_all(conn)
        .await
}

/// Fetches orders according to the filter, newest first, paginated.
pub async fn search_orders(filter: OrderQueryFilter, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let mut builder = QueryBuilder::new("SELECT * FROM orders ");
    if filter.buyer_id.is_some() || filter.status.is_some() {
        builder.push("WHERE ");
    }
    let mut where_clause = builder.separated(" AND ");
    if let Some(buyer_id) = filter.buyer_id {
        where_clause.push("buyer_id = ");
        where_clause.push_bind_unseparated(buyer_id);
    }
    if let Some(status) = filter.status {
        where_clause.push("status = ");
        where_clause.push_bind_unseparated(status.to_string());
    }
    builder.push(" ORDER BY created_at DESC, order_id DESC LIMIT ");
    builder.push_bind(filter.pagination.limit() as i64);
    builder.push(" OFFSET ");
    builder.push_bind(filter.pagination.offset() as i64);
    trace!("📝️ Executing query: {}", builder.sql());
    let orders = builder.build_query_as::<Order>().fetch_all(conn).await?;
    Ok(orders)
}

pub async fn update_order_status(
    order_id: &OrderId,
    status: OrderStatus,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as(
        "UPDATE orders SET status = $1, updated_at = CURRENT_TIMESTAMP WHERE order_id = $2 RETURNING *",
    )
    .bind(status)
    .bind(order_id.as_str())
    .fetch_optional(conn)
    .await
}

pub async fn update_payment_status(
    order_id: &OrderId,
    status: PaymentStatus,
    txid: Option<&str>,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as(
        r#"
            UPDATE orders
            SET payment_status = $1, payment_txid = COALESCE($2, payment_txid), updated_at = CURRENT_TIMESTAMP
            WHERE order_id = $3
            RETURNING *;
        "#,
    )
    .bind(status)
    .bind(txid)
    .bind(order_id.as_str())
    .fetch_optional(conn)
    .await
}
