//! Authentication error types.

use thiserror::Error;
use vidhive_core::error::VidhiveError;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid user credentials")]
    InvalidCredentials,

    #[error("token has expired")]
    TokenExpired,

    #[error("invalid token: {0}")]
    TokenInvalid(String),

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for VidhiveError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials
            | AuthError::TokenExpired
            | AuthError::TokenInvalid(_) => VidhiveError::Unauthorized {
                reason: err.to_string(),
            },
            AuthError::Crypto(msg) => VidhiveError::Crypto(msg),
        }
    }
}
