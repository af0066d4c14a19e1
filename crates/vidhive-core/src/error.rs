//! Error types for the VidHive system.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VidhiveError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Unauthorized: {reason}")]
    Unauthorized { reason: String },

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Entity already exists: {entity}")]
    Conflict { entity: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cryptography error: {0}")]
    Crypto(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type VidhiveResult<T> = Result<T, VidhiveError>;
