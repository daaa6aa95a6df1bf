//! # SQLite database methods
//!
//! "Low-level" SQLite interactions, kept as plain functions (rather than stateful structs) that
//! accept a `&mut SqliteConnection`. Callers can hand in a pooled connection, or pass `&mut tx`
//! to compose several calls into one atomic transaction without any other changes.
use std::{env, str::FromStr, time::Duration};

use log::info;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    Error as SqlxError,
    SqlitePool,
};

pub mod carts;
pub mod orders;
pub mod products;
pub mod reviews;
pub mod users;
pub mod wishlist;

const SQLITE_DB_URL: &str = "sqlite://data/market_store.db";

pub fn db_url() -> String {
    let result = env::var("MARKET_DATABASE_URL").unwrap_or_else(|_| {
        info!("MARKET_DATABASE_URL is not set. Using the default.");
        SQLITE_DB_URL.to_string()
    });
    info!("Using database URL: {result}");
    result
}

/// WAL mode lets pooled readers proceed while a writer holds the database, and the busy timeout
/// makes concurrent writers queue instead of failing with `SQLITE_BUSY`. Writes themselves must
/// run inside explicitly committed transactions; see [`crate::SqliteDatabase`].
pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, SqlxError> {
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5))
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect_with(options).await?;
    Ok(pool)
}

/// True when the error is a unique-constraint violation, used to translate duplicate
/// review/wishlist/email inserts into domain errors.
pub fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.kind() == sqlx::error::ErrorKind::UniqueViolation)
}
