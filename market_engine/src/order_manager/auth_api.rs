//! Signup and account lookup.
//!
//! Password hashing and token issuance live in the server crate; this API owns the pending-signup
//! lifecycle (create with a persisted expiry, verify, sweep) and the account lookups the token
//! layer needs. Pending signups survive restarts, so the expiry sweep works off the stored
//! `expires_at` rather than any in-process timer.

use std::fmt::Debug;

use chrono::{Duration, Utc};
use log::debug;
use rand::Rng;

use crate::{
    db_types::{NewPendingSignup, PendingSignup, User},
    order_manager::errors::AuthApiError,
    traits::AuthManagement,
};

#[derive(Clone)]
pub struct AuthApi<B> {
    db: B,
    signup_ttl: Duration,
}

impl<B> Debug for AuthApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AuthApi")
    }
}

impl<B> AuthApi<B>
where B: AuthManagement
{
    pub fn new(db: B, signup_ttl: Duration) -> Self {
        Self { db, signup_ttl }
    }

    /// Record a signup awaiting email verification. The password arrives already hashed.
    /// Re-registering before verifying replaces the pending row and restarts the expiry clock.
    pub async fn register(
        &self,
        email: String,
        display_name: String,
        password_hash: String,
    ) -> Result<PendingSignup, AuthApiError> {
        let verification_code = format!("{:06}", rand::thread_rng().gen_range(0..1_000_000));
        let signup = NewPendingSignup {
            email,
            display_name,
            password_hash,
            verification_code,
            expires_at: Utc::now() + self.signup_ttl,
        };
        let pending = self.db.upsert_pending_signup(signup).await?;
        debug!("📝️ Pending signup recorded for {}, expires {}", pending.email, pending.expires_at);
        Ok(pending)
    }

    /// Promote a pending signup to a verified user. Consumes the pending row on success.
    pub async fn verify(&self, email: &str, code: &str) -> Result<User, AuthApiError> {
        Ok(self.db.verify_signup(email, code, Utc::now()).await?)
    }

    /// One pass of the durable cleanup sweep. Returns the number of expired signups removed.
    pub async fn purge_expired(&self) -> Result<u64, AuthApiError> {
        Ok(self.db.purge_expired_signups(Utc::now()).await?)
    }

    /// Look up an account for a login attempt. An unknown email reports the same error the caller
    /// uses for a wrong password, so the endpoint cannot be used to probe for accounts.
    pub async fn user_for_login(&self, email: &str) -> Result<User, AuthApiError> {
        self.db.fetch_user_by_email(email).await?.ok_or(AuthApiError::InvalidCredentials)
    }

    pub async fn user_by_id(&self, user_id: i64) -> Result<Option<User>, AuthApiError> {
        Ok(self.db.fetch_user(user_id).await?)
    }
}
