//! Session service: registration, login, refresh rotation, logout,
//! and password change.

use tracing::debug;
use uuid::Uuid;
use vidhive_core::error::{VidhiveError, VidhiveResult};
use vidhive_core::models::user::{CreateUser, PublicUser};
use vidhive_core::repository::UserRepository;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::password;
use crate::token::{self, TokenKind};

/// Input for the registration flow.
#[derive(Debug)]
pub struct RegisterInput {
    pub full_name: String,
    pub email: String,
    pub username: String,
    pub password: String,
    /// Avatar reference produced by the upload pipeline, if any.
    /// Registration fails without one.
    pub avatar_url: Option<String>,
    pub cover_image_url: Option<String>,
}

/// Input for the login flow. At least one of `username`/`email` must
/// be given.
#[derive(Debug)]
pub struct LoginInput {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: String,
}

/// Successful login result.
#[derive(Debug)]
pub struct LoginOutput {
    pub user: PublicUser,
    /// Signed JWT access token.
    pub access_token: String,
    /// Signed JWT refresh token, string-equal to what is now stored
    /// on the user record.
    pub refresh_token: String,
}

/// Successful refresh result (new token pair).
#[derive(Debug)]
pub struct RefreshOutput {
    pub access_token: String,
    pub refresh_token: String,
}

/// Session lifecycle service.
///
/// Generic over the repository implementation so that the auth layer
/// has no dependency on the database crate.
pub struct SessionService<R: UserRepository> {
    repo: R,
    config: AuthConfig,
}

impl<R: UserRepository> SessionService<R> {
    pub fn new(repo: R, config: AuthConfig) -> Self {
        Self { repo, config }
    }

    /// Create a new account and return its outward profile.
    ///
    /// No tokens are issued here; a fresh account has no session
    /// until it logs in.
    pub async fn register(&self, input: RegisterInput) -> VidhiveResult<PublicUser> {
        // 1. All text fields present and non-blank after trim.
        let required = [
            input.full_name.as_str(),
            input.email.as_str(),
            input.username.as_str(),
            input.password.as_str(),
        ];
        if required.iter().any(|f| f.trim().is_empty()) {
            return Err(VidhiveError::Validation {
                message: "all fields are required".into(),
            });
        }

        // Usernames are case-insensitive: lower-case before both the
        // uniqueness check and storage.
        let username = input.username.trim().to_lowercase();
        let email = input.email.trim().to_string();

        // 2. Uniqueness of email, then username.
        match self.repo.get_by_email(&email).await {
            Ok(_) => {
                return Err(VidhiveError::Conflict {
                    entity: "user with this email".into(),
                });
            }
            Err(VidhiveError::NotFound { .. }) => {}
            Err(e) => return Err(e),
        }
        match self.repo.get_by_username(&username).await {
            Ok(_) => {
                return Err(VidhiveError::Conflict {
                    entity: "user with this username".into(),
                });
            }
            Err(VidhiveError::NotFound { .. }) => {}
            Err(e) => return Err(e),
        }

        // 3. The upload collaborator must have produced an avatar
        //    reference.
        let avatar_url = match input.avatar_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => url.to_string(),
            _ => {
                return Err(VidhiveError::Validation {
                    message: "avatar file is required".into(),
                });
            }
        };
        let cover_image_url = input
            .cover_image_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        // 4. Hash the password and create the record.
        let password_hash =
            password::hash_password(&input.password, self.config.pepper.as_deref())?;

        let user = self
            .repo
            .create(CreateUser {
                username,
                email,
                full_name: input.full_name.trim().to_string(),
                avatar_url,
                cover_image_url,
                password_hash,
            })
            .await?;

        debug!(user_id = %user.id, "user registered");
        Ok(user.into())
    }

    /// Authenticate with username-or-email plus password and issue a
    /// token pair.
    pub async fn login(&self, input: LoginInput) -> VidhiveResult<LoginOutput> {
        // 1. An identifier and a password must be present.
        let identifier = input
            .username
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .or_else(|| {
                input
                    .email
                    .as_deref()
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
            });
        let Some(identifier) = identifier else {
            return Err(VidhiveError::Validation {
                message: "username or email is required".into(),
            });
        };
        if input.password.trim().is_empty() {
            return Err(VidhiveError::Validation {
                message: "password is required".into(),
            });
        }

        // 2. Look up user: try username first, then email. An absent
        //    user surfaces as NotFound, not Unauthorized.
        let user = match self.repo.get_by_username(&identifier.to_lowercase()).await {
            Ok(u) => u,
            Err(VidhiveError::NotFound { .. }) => self.repo.get_by_email(identifier).await?,
            Err(e) => return Err(e),
        };

        // 3. Verify password.
        let valid = password::verify_password(
            &input.password,
            &user.password_hash,
            self.config.pepper.as_deref(),
        )?;
        if !valid {
            return Err(AuthError::InvalidCredentials.into());
        }

        // 4. Issue the pair and persist the refresh token,
        //    overwriting any prior value. This is the rotation point
        //    for a previous session of the same user.
        let access_token = token::issue_token(user.id, TokenKind::Access, &self.config)?;
        let refresh_token = token::issue_token(user.id, TokenKind::Refresh, &self.config)?;

        self.repo
            .set_refresh_token(user.id, refresh_token.clone())
            .await?;

        // Re-read so the returned profile reflects the rotation.
        let user = self.repo.get_by_id(user.id).await?;

        debug!(user_id = %user.id, "login succeeded");

        Ok(LoginOutput {
            user: user.into(),
            access_token,
            refresh_token,
        })
    }

    /// Exchange a refresh token for a new pair, rotating the stored
    /// token.
    ///
    /// Each refresh token is single-use. The swap is a conditional
    /// store update keyed on the presented token, so of two
    /// concurrent calls with the same token, exactly one succeeds.
    pub async fn refresh(&self, raw_refresh_token: &str) -> VidhiveResult<RefreshOutput> {
        // 1. A token must be presented at all.
        if raw_refresh_token.trim().is_empty() {
            return Err(VidhiveError::Unauthorized {
                reason: "refresh token is required".into(),
            });
        }

        // 2. Signature, expiry, and issuer check.
        let claims = token::decode_token(raw_refresh_token, TokenKind::Refresh, &self.config)?;

        // 3. The subject must still exist.
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AuthError::TokenInvalid("subject is not a user id".into()))?;
        match self.repo.get_by_id(user_id).await {
            Ok(_) => {}
            Err(VidhiveError::NotFound { .. }) => {
                return Err(AuthError::TokenInvalid("unknown subject".into()).into());
            }
            Err(e) => return Err(e),
        }

        // 4. Mint the replacement pair, then swap it in atomically.
        //    A rotated-out token mismatches the stored value and loses
        //    the swap even if it has not expired.
        let access_token = token::issue_token(user_id, TokenKind::Access, &self.config)?;
        let refresh_token = token::issue_token(user_id, TokenKind::Refresh, &self.config)?;

        match self
            .repo
            .rotate_refresh_token(user_id, raw_refresh_token, refresh_token.clone())
            .await
        {
            Ok(()) => {}
            Err(VidhiveError::NotFound { .. }) => {
                return Err(VidhiveError::Unauthorized {
                    reason: "refresh token is expired or already used".into(),
                });
            }
            Err(e) => return Err(e),
        }

        debug!(user_id = %user_id, "refresh token rotated");

        Ok(RefreshOutput {
            access_token,
            refresh_token,
        })
    }

    /// Clear the stored refresh token. Caller identity was already
    /// established by the access-token gate.
    pub async fn logout(&self, user_id: Uuid) -> VidhiveResult<()> {
        self.repo.clear_refresh_token(user_id).await?;
        debug!(user_id = %user_id, "logged out");
        Ok(())
    }

    /// Replace the password after verifying the current one.
    ///
    /// The active refresh token stays valid; see the design notes on
    /// password change vs. session revocation.
    pub async fn change_password(
        &self,
        user_id: Uuid,
        old_password: &str,
        new_password: &str,
    ) -> VidhiveResult<()> {
        // 1. Both fields present.
        if old_password.trim().is_empty() || new_password.trim().is_empty() {
            return Err(VidhiveError::Validation {
                message: "old and new password are required".into(),
            });
        }

        // 2. Verify the current password.
        let user = self.repo.get_by_id(user_id).await?;
        let valid = password::verify_password(
            old_password,
            &user.password_hash,
            self.config.pepper.as_deref(),
        )?;
        if !valid {
            return Err(VidhiveError::Unauthorized {
                reason: "invalid old password".into(),
            });
        }

        // 3. Store the new digest.
        let password_hash = password::hash_password(new_password, self.config.pepper.as_deref())?;
        self.repo.set_password_hash(user_id, password_hash).await?;

        debug!(user_id = %user_id, "password changed");
        Ok(())
    }
}
