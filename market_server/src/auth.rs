//! Access tokens and credentials.
//!
//! Tokens are compact HMAC-signed claims: `base64(claims-json).hex(hmac-sha256)`, keyed with the
//! server's API secret. The [`Claims`] extractor validates the signature and expiry on every
//! authenticated route; role checks happen in the handlers via [`Claims::require`].

use std::future::{ready, Ready};

use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use log::debug;
use market_common::{
    helpers::{from_hex, to_hex},
    Secret,
};
use market_engine::db_types::Role;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::errors::{AuthError, ServerError};

type HmacSha256 = Hmac<Sha256>;

const DEFAULT_TOKEN_TTL: Duration = Duration::hours(24);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,
    pub role: Role,
    /// Expiry as a unix timestamp in seconds.
    pub exp: i64,
}

impl Claims {
    pub fn require(&self, roles: &[Role]) -> Result<(), ServerError> {
        if roles.contains(&self.role) {
            Ok(())
        } else {
            Err(AuthError::InsufficientPermissions(format!("This action requires one of {roles:?}")).into())
        }
    }
}

impl FromRequest for Claims {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(claims_from_request(req))
    }
}

fn claims_from_request(req: &HttpRequest) -> Result<Claims, ServerError> {
    let issuer = req
        .app_data::<web::Data<TokenIssuer>>()
        .ok_or_else(|| ServerError::InitializeError("TokenIssuer is not configured".to_string()))?;
    let header = req.headers().get("Authorization").ok_or(AuthError::MissingToken)?;
    let header = header.to_str().map_err(|e| AuthError::InvalidToken(e.to_string()))?;
    let token =
        header.strip_prefix("Bearer ").ok_or_else(|| AuthError::InvalidToken("Expected a bearer token".to_string()))?;
    Ok(issuer.decode_token(token)?)
}

#[derive(Clone)]
pub struct TokenIssuer {
    secret: Secret<String>,
    token_ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: Secret<String>) -> Self {
        Self { secret, token_ttl: DEFAULT_TOKEN_TTL }
    }

    pub fn issue_token(&self, user_id: i64, role: Role) -> Result<String, ServerError> {
        let claims = Claims { user_id, role, exp: (Utc::now() + self.token_ttl).timestamp() };
        let body = serde_json::to_vec(&claims)
            .map_err(|e| ServerError::Unspecified(format!("Could not serialize access token. {e}")))?;
        let body = base64::encode_config(body, base64::URL_SAFE_NO_PAD);
        let sig = self.signature(&body);
        Ok(format!("{body}.{sig}"))
    }

    pub fn decode_token(&self, token: &str) -> Result<Claims, AuthError> {
        let (body, sig) =
            token.split_once('.').ok_or_else(|| AuthError::InvalidToken("Not in the expected format".to_string()))?;
        let sig = from_hex(sig).ok_or_else(|| AuthError::InvalidToken("Malformed signature".to_string()))?;
        let mut mac = HmacSha256::new_from_slice(self.secret.reveal().as_bytes())
            .expect("HMAC accepts keys of any length");
        mac.update(body.as_bytes());
        mac.verify_slice(&sig).map_err(|_| AuthError::InvalidToken("Signature mismatch".to_string()))?;
        let body = base64::decode_config(body, base64::URL_SAFE_NO_PAD)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        let claims: Claims = serde_json::from_slice(&body).map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        if claims.exp <= Utc::now().timestamp() {
            debug!("🔐️ Rejected an expired access token for user #{}", claims.user_id);
            return Err(AuthError::ExpiredToken);
        }
        Ok(claims)
    }

    fn signature(&self, body: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(self.secret.reveal().as_bytes())
            .expect("HMAC accepts keys of any length");
        mac.update(body.as_bytes());
        to_hex(&mac.finalize().into_bytes())
    }
}

//--------------------------------------     Passwords      ----------------------------------------------------

/// Salted hash in the form `{salt}${digest}`, both hex.
pub fn hash_password(password: &str) -> String {
    let salt: [u8; 16] = rand::random();
    let salt = to_hex(&salt);
    let digest = Sha256::digest(format!("{salt}${password}").as_bytes());
    format!("{salt}${}", to_hex(&digest))
}

pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt, expected)) = stored.split_once('$') else {
        return false;
    };
    let Some(expected) = from_hex(expected) else {
        return false;
    };
    let digest = Sha256::digest(format!("{salt}${password}").as_bytes());
    digest.as_slice() == expected.as_slice()
}

#[cfg(test)]
mod test {
    use super::*;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(Secret::new("test-api-secret".to_string()))
    }

    #[test]
    fn issued_tokens_round_trip() {
        let issuer = issuer();
        let token = issuer.issue_token(42, Role::Buyer).unwrap();
        let claims = issuer.decode_token(&token).unwrap();
        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.role, Role::Buyer);
    }

    #[test]
    fn tampered_tokens_are_rejected() {
        let issuer = issuer();
        let token = issuer.issue_token(42, Role::Buyer).unwrap();
        // Flip a character in the body; the signature no longer matches
        let mut chars: Vec<char> = token.chars().collect();
        chars[0] = if chars[0] == 'A' { 'B' } else { 'A' };
        let tampered: String = chars.into_iter().collect();
        assert!(issuer.decode_token(&tampered).is_err());
    }

    #[test]
    fn tokens_from_another_secret_are_rejected() {
        let token = issuer().issue_token(42, Role::Admin).unwrap();
        let other = TokenIssuer::new(Secret::new("another-secret".to_string()));
        assert!(matches!(other.decode_token(&token), Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let mut issuer = issuer();
        issuer.token_ttl = Duration::seconds(-1);
        let token = issuer.issue_token(42, Role::Buyer).unwrap();
        assert!(matches!(TokenIssuer::new(Secret::new("test-api-secret".to_string())).decode_token(&token), Err(AuthError::ExpiredToken)));
    }

    #[test]
    fn password_hashes_verify_and_salts_differ() {
        let a = hash_password("hunter2");
        let b = hash_password("hunter2");
        assert_ne!(a, b);
        assert!(verify_password("hunter2", &a));
        assert!(verify_password("hunter2", &b));
        assert!(!verify_password("hunter3", &a));
        assert!(!verify_password("hunter2", "garbage"));
    }
}
