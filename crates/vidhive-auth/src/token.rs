//! JWT issuance and verification for access and refresh tokens.
//!
//! Both kinds are HS256-signed, each with its own secret, so a token
//! of one kind can never verify as the other.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;

/// Selects the signing secret and lifetime for a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    fn secret<'a>(self, config: &'a AuthConfig) -> &'a [u8] {
        match self {
            TokenKind::Access => config.access_token_secret.as_bytes(),
            TokenKind::Refresh => config.refresh_token_secret.as_bytes(),
        }
    }

    fn lifetime_secs(self, config: &AuthConfig) -> u64 {
        match self {
            TokenKind::Access => config.access_token_lifetime_secs,
            TokenKind::Refresh => config.refresh_token_lifetime_secs,
        }
    }
}

/// JWT claims embedded in every token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: user ID (UUID string).
    pub sub: String,
    /// Issuer.
    pub iss: String,
    /// Issued-at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
    /// Unique token ID (UUID string). Makes back-to-back issuances
    /// distinct even within the same second.
    pub jti: String,
}

/// Issue a signed HS256 JWT of the given kind.
pub fn issue_token(
    user_id: Uuid,
    kind: TokenKind,
    config: &AuthConfig,
) -> Result<String, AuthError> {
    let now = Utc::now().timestamp();
    let claims = TokenClaims {
        sub: user_id.to_string(),
        iss: config.jwt_issuer.clone(),
        iat: now,
        exp: now + kind.lifetime_secs(config) as i64,
        jti: Uuid::new_v4().to_string(),
    };

    let key = EncodingKey::from_secret(kind.secret(config));
    let header = Header::new(Algorithm::HS256);
    jsonwebtoken::encode(&header, &claims, &key)
        .map_err(|e| AuthError::Crypto(format!("JWT encode: {e}")))
}

/// Decode and verify a JWT of the given kind (signature, expiry,
/// issuer).
///
/// Expiry is reported as [`AuthError::TokenExpired`]; every other
/// failure collapses into [`AuthError::TokenInvalid`] so callers
/// cannot tell why a token was rejected.
pub fn decode_token(
    token: &str,
    kind: TokenKind,
    config: &AuthConfig,
) -> Result<TokenClaims, AuthError> {
    let key = DecodingKey::from_secret(kind.secret(config));

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[&config.jwt_issuer]);
    validation.set_required_spec_claims(&["sub", "exp", "iat", "iss"]);

    jsonwebtoken::decode::<TokenClaims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::TokenInvalid(e.to_string()),
        })
}
