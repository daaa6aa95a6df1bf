use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::db_types::{NewPendingSignup, PendingSignup, User};

#[derive(Debug, Error)]
pub enum AuthDbError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
    #[error("An account with this email already exists")]
    EmailTaken,
    #[error("No pending signup matches")]
    SignupNotFound,
    #[error("The verification code is incorrect or has expired")]
    InvalidVerification,
}

#[allow(async_fn_in_trait)]
pub trait AuthManagement: Clone {
    /// Record a signup awaiting verification. Re-registering the same email before verification
    /// replaces the pending row (and its expiry); an email that already belongs to a verified
    /// user is rejected.
    async fn upsert_pending_signup(&self, signup: NewPendingSignup) -> Result<PendingSignup, AuthDbError>;

    /// Promote a pending signup to a full user if the code matches and the signup has not
    /// expired. The pending row is consumed.
    async fn verify_signup(&self, email: &str, code: &str, now: DateTime<Utc>) -> Result<User, AuthDbError>;

    /// Delete pending signups whose persisted expiry has passed. Returns the number removed.
    /// Called from the periodic sweep, so missed runs (or restarts) only delay cleanup.
    async fn purge_expired_signups(&self, now: DateTime<Utc>) -> Result<u64, AuthDbError>;

    async fn fetch_user_by_email(&self, email: &str) -> Result<Option<User>, AuthDbError>;

    async fn fetch_user(&self, user_id: i64) -> Result<Option<User>, AuthDbError>;
}
