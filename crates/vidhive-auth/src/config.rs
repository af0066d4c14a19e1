//! Authentication configuration.

/// Configuration for the session service.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HMAC secret for signing access tokens.
    pub access_token_secret: String,
    /// HMAC secret for signing refresh tokens. Must differ from the
    /// access secret so one token kind can never pass for the other.
    pub refresh_token_secret: String,
    /// Access token lifetime in seconds (default: 900 = 15 minutes).
    pub access_token_lifetime_secs: u64,
    /// Refresh token lifetime in seconds (default: 864_000 = 10 days).
    pub refresh_token_lifetime_secs: u64,
    /// JWT issuer (`iss` claim).
    pub jwt_issuer: String,
    /// Optional pepper prepended to passwords before Argon2id hashing.
    pub pepper: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_token_secret: String::new(),
            refresh_token_secret: String::new(),
            access_token_lifetime_secs: 900,
            refresh_token_lifetime_secs: 864_000,
            jwt_issuer: "vidhive".into(),
            pepper: None,
        }
    }
}

impl AuthConfig {
    /// Build a config from `ACCESS_TOKEN_SECRET`, `REFRESH_TOKEN_SECRET`,
    /// `ACCESS_TOKEN_TTL_SECS`, `REFRESH_TOKEN_TTL_SECS`,
    /// `VIDHIVE_JWT_ISSUER` and `VIDHIVE_PASSWORD_PEPPER`, falling back
    /// to the defaults for anything unset.
    ///
    /// Secrets default to empty strings; the server rejects empty
    /// secrets at startup rather than here, so tests can build configs
    /// without touching the process environment.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            access_token_secret: std::env::var("ACCESS_TOKEN_SECRET")
                .unwrap_or(defaults.access_token_secret),
            refresh_token_secret: std::env::var("REFRESH_TOKEN_SECRET")
                .unwrap_or(defaults.refresh_token_secret),
            access_token_lifetime_secs: std::env::var("ACCESS_TOKEN_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.access_token_lifetime_secs),
            refresh_token_lifetime_secs: std::env::var("REFRESH_TOKEN_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.refresh_token_lifetime_secs),
            jwt_issuer: std::env::var("VIDHIVE_JWT_ISSUER").unwrap_or(defaults.jwt_issuer),
            pepper: std::env::var("VIDHIVE_PASSWORD_PEPPER")
                .ok()
                .filter(|p| !p.is_empty()),
        }
    }
}
