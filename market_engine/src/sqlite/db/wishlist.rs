use sqlx::SqliteConnection;

use crate::db_types::WishlistItem;

/// Idempotent add: re-adding an already wishlisted product is a no-op.
pub async fn add_to_wishlist(buyer_id: i64, product_id: i64, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT OR IGNORE INTO wishlist_lines (buyer_id, product_id) VALUES ($1, $2)")
        .bind(buyer_id)
        .bind(product_id)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn remove_from_wishlist(
    buyer_id: i64,
    product_id: i64,
    conn: &mut SqliteConnection,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM wishlist_lines WHERE buyer_id = $1 AND product_id = $2")
        .bind(buyer_id)
        .bind(product_id)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn fetch_wishlist(buyer_id: i64, conn: &mut SqliteConnection) -> Result<Vec<WishlistItem>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT p.id AS product_id, p.name AS name, p.price AS price, p.stock AS stock
        FROM wishlist_lines w JOIN products p ON p.id = w.product_id
        WHERE w.buyer_id = $1
        ORDER BY w.created_at DESC"#,
    )
    .bind(buyer_id)
    .fetch_all(conn)
    .await
}
