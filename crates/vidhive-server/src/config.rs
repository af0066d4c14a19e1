//! Process configuration, read once at startup.

use anyhow::{Result, bail};
use vidhive_auth::AuthConfig;
use vidhive_db::DbConfig;

/// Everything the server needs, assembled from the environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port for the HTTP listener (`VIDHIVE_HTTP_PORT`, default 8080).
    pub http_port: u16,
    /// Marks both session cookies `Secure` (`COOKIE_SECURE`, default
    /// true; disable only for plain-HTTP local development).
    pub cookie_secure: bool,
    /// Exact allowed CORS origin (`VIDHIVE_CORS_ORIGIN`). No CORS
    /// layer is mounted when unset.
    pub cors_origin: Option<String>,
    pub db: DbConfig,
    pub auth: AuthConfig,
}

impl ServerConfig {
    /// Read the full configuration from the environment.
    ///
    /// Fails when either signing secret is missing or when both kinds
    /// share one secret; issuing tokens with an empty or shared HMAC
    /// key must never happen silently.
    pub fn from_env() -> Result<Self> {
        let auth = AuthConfig::from_env();
        if auth.access_token_secret.is_empty() || auth.refresh_token_secret.is_empty() {
            bail!("ACCESS_TOKEN_SECRET and REFRESH_TOKEN_SECRET must be set");
        }
        if auth.access_token_secret == auth.refresh_token_secret {
            bail!("ACCESS_TOKEN_SECRET and REFRESH_TOKEN_SECRET must differ");
        }

        let http_port = std::env::var("VIDHIVE_HTTP_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(8080);
        let cookie_secure = std::env::var("COOKIE_SECURE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(true);
        let cors_origin = std::env::var("VIDHIVE_CORS_ORIGIN")
            .ok()
            .filter(|v| !v.is_empty());

        Ok(Self {
            http_port,
            cookie_secure,
            cors_origin,
            db: DbConfig::from_env(),
            auth,
        })
    }
}
