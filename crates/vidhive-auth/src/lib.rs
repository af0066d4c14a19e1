//! VidHive Auth: password hashing, JWT issuance/validation, and the
//! session lifecycle (register, login, refresh rotation, logout).

pub mod config;
pub mod error;
pub mod password;
pub mod service;
pub mod token;

pub use config::AuthConfig;
pub use error::AuthError;
pub use service::{LoginInput, LoginOutput, RefreshOutput, RegisterInput, SessionService};
pub use token::{TokenClaims, TokenKind};
