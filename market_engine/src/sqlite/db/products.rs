use log::trace;
use sqlx::{QueryBuilder, SqliteConnection};

use crate::{
    db_types::{NewProduct, Product, UpdateProduct},
    order_objects::ProductQueryFilter,
};

pub async fn insert_product(product: &NewProduct, conn: &mut SqliteConnection) -> Result<Product, sqlx::Error> {
    sqlx::query_as(
        r#"
            INSERT INTO products (artist_id, name, description, price, stock)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *;
        "#,
    )
    .bind(product.artist_id)
    .bind(&product.name)
    .bind(&product.description)
    .bind(product.price)
    .bind(product.stock)
    .fetch_one(conn)
    .await
}

/// Applies the non-empty fields of the update. The artist id in the WHERE clause is the
/// ownership check: updating someone else's product matches no rows.
pub async fn update_product(
    product_id: i64,
    artist_id: i64,
    update: UpdateProduct,
    conn: &mut SqliteConnection,
) -> Result<Option<Product>, sqlx::Error> {
    let mut builder = QueryBuilder::new("UPDATE products SET updated_at = CURRENT_TIMESTAMP, ");
    let mut set_clause = builder.separated(", ");
    if let Some(name) = update.name {
        set_clause.push("name = ");
        set_clause.push_bind_unseparated(name);
    }
    if let Some(description) = update.description {
        set_clause.push("description = ");
        set_clause.push_bind_unseparated(description);
    }
    if let Some(price) = update.price {
        set_clause.push("price = ");
        set_clause.push_bind_unseparated(price);
    }
    if let Some(stock) = update.stock {
        set_clause.push("stock = ");
        set_clause.push_bind_unseparated(stock);
    }
    builder.push(" WHERE id = ");
    builder.push_bind(product_id);
    builder.push(" AND artist_id = ");
    builder.push_bind(artist_id);
    builder.push(" RETURNING *");
    trace!("📝️ Executing query: {}", builder.sql());
    builder.build_query_as::<Product>().fetch_optional(conn).await
}

pub async fn delete_product(product_id: i64, artist_id: i64, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let res = sqlx::query("DELETE FROM products WHERE id = $1 AND artist_id = $2")
        .bind(product_id)
        .bind(artist_id)
        .execute(conn)
        .await?;
    Ok(res.rows_affected() > 0)
}

pub async fn fetch_product(product_id: i64, conn: &mut SqliteConnection) -> Result<Option<Product>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM products WHERE id = $1").bind(product_id).fetch_optional(conn).await
}

pub async fn search_products(
    filter: ProductQueryFilter,
    conn: &mut SqliteConnection,
) -> Result<Vec<Product>, sqlx::Error> {
    let mut builder = QueryBuilder::new("SELECT * FROM products ");
    if filter.artist_id.is_some() || filter.search.is_some() {
        builder.push("WHERE ");
    }
    let mut where_clause = builder.separated(" AND ");
    if let Some(artist_id) = filter.artist_id {
        where_clause.push("artist_id = ");
        where_clause.push_bind_unseparated(artist_id);
    }
    if let Some(search) = filter.search {
        where_clause.push("name LIKE ");
        where_clause.push_bind_unseparated(format!("%{search}%"));
    }
    builder.push(" ORDER BY created_at DESC, id DESC LIMIT ");
    builder.push_bind(filter.pagination.limit() as i64);
    builder.push(" OFFSET ");
    builder.push_bind(filter.pagination.offset() as i64);
    trace!("📝️ Executing query: {}", builder.sql());
    builder.build_query_as::<Product>().fetch_all(conn).await
}

/// Decrements available stock, guarded so it can never go negative. Returns `false` (and changes
/// nothing) when fewer than `quantity` units remain or the product does not exist.
pub async fn decrement_stock(
    product_id: i64,
    quantity: i64,
    conn: &mut SqliteConnection,
) -> Result<bool, sqlx::Error> {
    let res = sqlx::query(
        "UPDATE products SET stock = stock - $2, updated_at = CURRENT_TIMESTAMP WHERE id = $1 AND stock >= $2",
    )
    .bind(product_id)
    .bind(quantity)
    .execute(conn)
    .await?;
    Ok(res.rows_affected() > 0)
}

/// Restores stock on cancellation. The inverse of [`decrement_stock`].
pub async fn restore_stock(product_id: i64, quantity: i64, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE products SET stock = stock + $2, updated_at = CURRENT_TIMESTAMP WHERE id = $1")
        .bind(product_id)
        .bind(quantity)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn available_stock(product_id: i64, conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    let stock: Option<(i64,)> =
        sqlx::query_as("SELECT stock FROM products WHERE id = $1").bind(product_id).fetch_optional(conn).await?;
    Ok(stock.map(|(s,)| s).unwrap_or(0))
}
