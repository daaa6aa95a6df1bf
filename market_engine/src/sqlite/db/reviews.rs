use sqlx::SqliteConnection;

use crate::db_types::{NewReview, Review};

/// Inserts a review. The (buyer, product) unique constraint surfaces as a database error here;
/// the backend translates it to `DuplicateReview`.
pub async fn insert_review(
    buyer_id: i64,
    review: &NewReview,
    conn: &mut SqliteConnection,
) -> Result<Review, sqlx::Error> {
    sqlx::query_as(
        r#"
            INSERT INTO reviews (buyer_id, product_id, rating, body)
            VALUES ($1, $2, $3, $4)
            RETURNING *;
        "#,
    )
    .bind(buyer_id)
    .bind(review.product_id)
    .bind(review.rating)
    .bind(&review.body)
    .fetch_one(conn)
    .await
}

/// Only the author may update; the buyer id in the WHERE clause enforces it.
pub async fn update_review(
    review_id: i64,
    buyer_id: i64,
    rating: i64,
    body: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Review>, sqlx::Error> {
    sqlx::query_as(
        r#"
            UPDATE reviews SET rating = $3, body = $4, updated_at = CURRENT_TIMESTAMP
            WHERE id = $1 AND buyer_id = $2
            RETURNING *;
        "#,
    )
    .bind(review_id)
    .bind(buyer_id)
    .bind(rating)
    .bind(body)
    .fetch_optional(conn)
    .await
}

pub async fn delete_review(review_id: i64, buyer_id: i64, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let res = sqlx::query("DELETE FROM reviews WHERE id = $1 AND buyer_id = $2")
        .bind(review_id)
        .bind(buyer_id)
        .execute(conn)
        .await?;
    Ok(res.rows_affected() > 0)
}

pub async fn fetch_review(review_id: i64, conn: &mut SqliteConnection) -> Result<Option<Review>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM reviews WHERE id = $1").bind(review_id).fetch_optional(conn).await
}

pub async fn fetch_reviews_for_product(
    product_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<Review>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM reviews WHERE product_id = $1 ORDER BY created_at DESC")
        .bind(product_id)
        .fetch_all(conn)
        .await
}
