use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::config::SecurityConfig;

/// Signed session claims binding an account id/username/email to an absolute expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i32,
    pub username: String,
    pub email: String,
    pub exp: i64,
    pub iat: i64,
    /// Expiry rendered as RFC 3339, for clients that do not decode `exp`.
    pub expiso: String,
}

impl Claims {
    pub fn new(user_id: i32, username: impl Into<String>, email: impl Into<String>, ttl: Duration) -> Self {
        let now = Utc::now();
        let expires = now + ttl;

        Self {
            user_id,
            username: username.into(),
            email: email.into(),
            exp: expires.timestamp(),
            iat: now.timestamp(),
            expiso: expires.to_rfc3339(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Bad signature, malformed encoding or past expiry.
    #[error("Invalid or expired JWT token.")]
    ExpiredOrInvalid,

    #[error("JWT secret not configured")]
    MissingSecret,

    #[error("{0}")]
    Encoding(String),
}

/// HS256 session token codec. The secret is read once from configuration and never mutated.
#[derive(Clone)]
pub struct TokenCodec {
    secret: Arc<str>,
    ttl: Duration,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec").field("ttl", &self.ttl).finish_non_exhaustive()
    }
}

impl TokenCodec {
    pub fn new(secret: impl Into<Arc<str>>, ttl: Duration) -> Self {
        Self { secret: secret.into(), ttl }
    }

    pub fn from_config(security: &SecurityConfig) -> Self {
        Self::new(security.jwt_secret.as_str(), Duration::hours(security.jwt_expiry_hours as i64))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Mint a token for the given account valid for the configured window.
    pub fn issue(&self, user_id: i32, username: &str, email: &str) -> Result<String, TokenError> {
        self.encode(&Claims::new(user_id, username, email, self.ttl))
    }

    pub fn encode(&self, claims: &Claims) -> Result<String, TokenError> {
        if self.secret.is_empty() {
            return Err(TokenError::MissingSecret);
        }

        let encoding_key = EncodingKey::from_secret(self.secret.as_bytes());
        encode(&Header::new(Algorithm::HS256), claims, &encoding_key)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        if self.secret.is_empty() {
            return Err(TokenError::MissingSecret);
        }

        let decoding_key = DecodingKey::from_secret(self.secret.as_bytes());
        let validation = Validation::new(Algorithm::HS256);

        decode::<Claims>(token, &decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidToken
                | ErrorKind::InvalidSignature
                | ErrorKind::ExpiredSignature
                | ErrorKind::ImmatureSignature
                | ErrorKind::InvalidAlgorithm
                | ErrorKind::MissingRequiredClaim(_)
                | ErrorKind::Base64(_)
                | ErrorKind::Json(_)
                | ErrorKind::Utf8(_) => TokenError::ExpiredOrInvalid,
                _ => TokenError::Encoding(e.to_string()),
            })
    }
}

/// One-way digest of a secret for storage and login comparison.
///
/// Unsalted SHA-256 rendered as lowercase hex. Deterministic so that login can compare
/// digests directly; weaker than a salted KDF, and stored accounts depend on the exact format.
pub fn hash_password(password: &str) -> String {
    format!("{:x}", Sha256::digest(password.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> TokenCodec {
        TokenCodec::new("test-secret", Duration::days(3))
    }

    #[test]
    fn issued_token_verifies_and_round_trips_claims() {
        let codec = codec();
        let token = codec.issue(7, "alice", "alice@example.com").unwrap();

        let claims = codec.verify(&token).unwrap();
        assert_eq!(claims.user_id, 7);
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.email, "alice@example.com");
        assert_eq!(claims.exp - claims.iat, 3 * 24 * 60 * 60);
    }

    #[test]
    fn wrong_secret_is_expired_or_invalid() {
        let token = codec().issue(1, "bob", "bob@example.com").unwrap();
        let other = TokenCodec::new("other-secret", Duration::days(3));

        assert_eq!(other.verify(&token), Err(TokenError::ExpiredOrInvalid));
    }

    #[test]
    fn expired_token_is_rejected() {
        let codec = codec();
        let claims = Claims::new(1, "bob", "bob@example.com", Duration::hours(-2));
        let token = codec.encode(&claims).unwrap();

        assert_eq!(codec.verify(&token), Err(TokenError::ExpiredOrInvalid));
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert_eq!(codec().verify("not.a.jwt"), Err(TokenError::ExpiredOrInvalid));
        assert_eq!(codec().verify(""), Err(TokenError::ExpiredOrInvalid));
    }

    #[test]
    fn empty_secret_is_refused() {
        let codec = TokenCodec::new("", Duration::days(3));
        assert_eq!(codec.issue(1, "bob", "bob@example.com"), Err(TokenError::MissingSecret));
        assert_eq!(codec.verify("a.b.c"), Err(TokenError::MissingSecret));
    }

    #[test]
    fn password_hash_is_hex_sha256() {
        assert_eq!(
            hash_password("p"),
            "148de9c5a7a44d19e56cd9ae1a554bf67847afb0c58f6e12fa29ac7ddfca9940"
        );
        assert_eq!(hash_password("secret"), hash_password("secret"));
        assert_ne!(hash_password("secret"), hash_password("Secret"));
    }
}
