use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;

use crate::db_types::{Address, NewAddress, NewPendingSignup, PendingSignup, Role, User};

pub async fn fetch_user_by_email(email: &str, conn: &mut SqliteConnection) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM users WHERE email = $1").bind(email).fetch_optional(conn).await
}

pub async fn fetch_user(user_id: i64, conn: &mut SqliteConnection) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM users WHERE id = $1").bind(user_id).fetch_optional(conn).await
}

pub async fn insert_user(
    email: &str,
    display_name: &str,
    password_hash: &str,
    role: Role,
    conn: &mut SqliteConnection,
) -> Result<User, sqlx::Error> {
    sqlx::query_as(
        r#"
            INSERT INTO users (email, display_name, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING *;
        "#,
    )
    .bind(email)
    .bind(display_name)
    .bind(password_hash)
    .bind(role)
    .fetch_one(conn)
    .await
}

/// Re-registering before verification replaces the pending row, including its expiry and code.
pub async fn upsert_pending_signup(
    signup: &NewPendingSignup,
    conn: &mut SqliteConnection,
) -> Result<PendingSignup, sqlx::Error> {
    sqlx::query_as(
        r#"
            INSERT INTO pending_signups (email, display_name, password_hash, verification_code, expires_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (email) DO UPDATE SET
                display_name = excluded.display_name,
                password_hash = excluded.password_hash,
                verification_code = excluded.verification_code,
                expires_at = excluded.expires_at
            RETURNING *;
        "#,
    )
    .bind(&signup.email)
    .bind(&signup.display_name)
    .bind(&signup.password_hash)
    .bind(&signup.verification_code)
    .bind(signup.expires_at)
    .fetch_one(conn)
    .await
}

pub async fn fetch_pending_signup(
    email: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<PendingSignup>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM pending_signups WHERE email = $1").bind(email).fetch_optional(conn).await
}

pub async fn delete_pending_signup(email: &str, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM pending_signups WHERE email = $1").bind(email).execute(conn).await?;
    Ok(())
}

/// The durable cleanup sweep: anything whose persisted expiry has passed is removed, regardless
/// of how many process restarts happened since the signup.
pub async fn purge_expired_signups(now: DateTime<Utc>, conn: &mut SqliteConnection) -> Result<u64, sqlx::Error> {
    let res = sqlx::query("DELETE FROM pending_signups WHERE expires_at <= $1").bind(now).execute(conn).await?;
    Ok(res.rows_affected())
}

pub async fn insert_address(
    buyer_id: i64,
    address: &NewAddress,
    conn: &mut SqliteConnection,
) -> Result<Address, sqlx::Error> {
    sqlx::query_as(
        r#"
            INSERT INTO addresses (buyer_id, recipient, line1, line2, city, state, postcode, phone)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *;
        "#,
    )
    .bind(buyer_id)
    .bind(&address.recipient)
    .bind(&address.line1)
    .bind(&address.line2)
    .bind(&address.city)
    .bind(&address.state)
    .bind(&address.postcode)
    .bind(&address.phone)
    .fetch_one(conn)
    .await
}

/// Scoped to the buyer: a foreign address id reads as absent.
pub async fn fetch_address_for_buyer(
    address_id: i64,
    buyer_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Address>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM addresses WHERE id = $1 AND buyer_id = $2")
        .bind(address_id)
        .bind(buyer_id)
        .fetch_optional(conn)
        .await
}

pub async fn fetch_addresses(buyer_id: i64, conn: &mut SqliteConnection) -> Result<Vec<Address>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM addresses WHERE buyer_id = $1 ORDER BY created_at DESC")
        .bind(buyer_id)
        .fetch_all(conn)
        .await
}
