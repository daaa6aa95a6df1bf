use sqlx::SqliteConnection;

use crate::db_types::{CartItem, CartLine};

/// Adds quantity to the buyer's line for this product, creating the line if it does not exist.
/// The increment happens inside the database so concurrent adds cannot lose updates.
pub async fn add_to_cart(
    buyer_id: i64,
    product_id: i64,
    quantity: i64,
    conn: &mut SqliteConnection,
) -> Result<CartLine, sqlx::Error> {
    let line = sqlx::query_as(
        r#"
            INSERT INTO cart_lines (buyer_id, product_id, quantity) VALUES ($1, $2, $3)
            ON CONFLICT (buyer_id, product_id)
            DO UPDATE SET quantity = quantity + excluded.quantity, updated_at = CURRENT_TIMESTAMP
            RETURNING *;
        "#,
    )
    .bind(buyer_id)
    .bind(product_id)
    .bind(quantity)
    .fetch_one(conn)
    .await?;
    Ok(line)
}

/// Sets the absolute quantity on an existing line. Returns `None` if no line exists.
pub async fn set_quantity(
    buyer_id: i64,
    product_id: i64,
    quantity: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<CartLine>, sqlx::Error> {
    sqlx::query_as(
        "UPDATE cart_lines SET quantity = $3, updated_at = CURRENT_TIMESTAMP WHERE buyer_id = $1 AND product_id = \
         $2 RETURNING *",
    )
    .bind(buyer_id)
    .bind(product_id)
    .bind(quantity)
    .fetch_optional(conn)
    .await
}

pub async fn remove_line(buyer_id: i64, product_id: i64, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM cart_lines WHERE buyer_id = $1 AND product_id = $2")
        .bind(buyer_id)
        .bind(product_id)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn clear_cart(buyer_id: i64, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM cart_lines WHERE buyer_id = $1").bind(buyer_id).execute(conn).await?;
    Ok(())
}

/// The cart joined with live product data. Lines whose product has been deleted drop out here.
pub async fn fetch_cart(buyer_id: i64, conn: &mut SqliteConnection) -> Result<Vec<CartItem>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT
            p.id AS product_id,
            p.artist_id AS artist_id,
            p.name AS name,
            p.price AS unit_price,
            c.quantity AS quantity,
            p.stock AS stock
        FROM cart_lines c JOIN products p ON p.id = c.product_id
        WHERE c.buyer_id = $1
        ORDER BY c.created_at ASC"#,
    )
    .bind(buyer_id)
    .fetch_all(conn)
    .await
}
