//! Access-token gate for protected routes.

use axum::http::HeaderMap;
use surrealdb::Connection;
use uuid::Uuid;
use vidhive_auth::token::{self, TokenKind};
use vidhive_core::VidhiveError;
use vidhive_core::models::user::User;
use vidhive_core::repository::UserRepository;

use crate::api::{AppState, cookies};

/// Resolve the calling user from the access token, cookie or bearer.
///
/// Every failure mode maps to `Unauthorized`; protected handlers call
/// this before touching any state.
pub async fn require_user<C: Connection>(
    headers: &HeaderMap,
    state: &AppState<C>,
) -> Result<User, VidhiveError> {
    let Some(raw) = cookies::access_token(headers) else {
        return Err(VidhiveError::Unauthorized {
            reason: "unauthorized request".into(),
        });
    };

    let claims = token::decode_token(&raw, TokenKind::Access, &state.auth)?;

    let user_id = Uuid::parse_str(&claims.sub).map_err(|_| VidhiveError::Unauthorized {
        reason: "invalid access token".into(),
    })?;

    match state.users.get_by_id(user_id).await {
        Ok(user) => Ok(user),
        // The subject may have been deleted since issuance.
        Err(VidhiveError::NotFound { .. }) => Err(VidhiveError::Unauthorized {
            reason: "invalid access token".into(),
        }),
        Err(e) => Err(e),
    }
}
