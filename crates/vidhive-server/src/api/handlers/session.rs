//! Session lifecycle endpoints: register, login, logout, refresh
//! rotation, password change.
//!
//! Request bodies are optional at the extractor level; a missing or
//! unparseable body degrades to empty fields so the service layer
//! answers with its own field-presence validation instead of a bare
//! framework rejection.

use std::sync::Arc;

use axum::http::HeaderMap;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use surrealdb::Connection;
use vidhive_auth::service::{LoginInput, RegisterInput};
use vidhive_core::VidhiveError;
use vidhive_core::models::user::PublicUser;

use crate::api::envelope::{ApiError, ApiResponse};
use crate::api::{AppState, cookies, guard};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisterRequest {
    pub full_name: String,
    pub email: String,
    pub user_name: String,
    pub password: String,
    /// Avatar reference produced by the upload pipeline.
    pub avatar: Option<String>,
    pub cover_image: Option<String>,
}

/// POST /api/v1/users/register
pub async fn register<C: Connection>(
    Extension(state): Extension<Arc<AppState<C>>>,
    body: Option<Json<RegisterRequest>>,
) -> Result<ApiResponse<PublicUser>, ApiError> {
    let body = body.map(|Json(b)| b).unwrap_or_default();

    let user = state
        .sessions
        .register(RegisterInput {
            full_name: body.full_name,
            email: body.email,
            username: body.user_name,
            password: body.password,
            avatar_url: body.avatar,
            cover_image_url: body.cover_image,
        })
        .await?;

    Ok(ApiResponse::created(user, "user registered successfully"))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoginRequest {
    pub user_name: Option<String>,
    pub email: Option<String>,
    pub password: String,
}

/// Login response body; the token pair rides in the body as well as
/// in the cookies, for clients that cannot store cookies.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionBody {
    pub user: PublicUser,
    pub access_token: String,
    pub refresh_token: String,
}

/// POST /api/v1/users/login
pub async fn login<C: Connection>(
    Extension(state): Extension<Arc<AppState<C>>>,
    body: Option<Json<LoginRequest>>,
) -> Result<(HeaderMap, ApiResponse<SessionBody>), ApiError> {
    let body = body.map(|Json(b)| b).unwrap_or_default();

    let out = state
        .sessions
        .login(LoginInput {
            username: body.user_name,
            email: body.email,
            password: body.password,
        })
        .await?;

    let mut headers = HeaderMap::new();
    cookies::set_session_cookies(
        &mut headers,
        &out.access_token,
        &out.refresh_token,
        &state.auth,
        state.cookie_secure,
    )
    .map_err(|e| VidhiveError::Internal(format!("cookie header: {e}")))?;

    Ok((
        headers,
        ApiResponse::ok(
            SessionBody {
                user: out.user,
                access_token: out.access_token,
                refresh_token: out.refresh_token,
            },
            "user logged in successfully",
        ),
    ))
}

/// POST /api/v1/users/logout
pub async fn logout<C: Connection>(
    Extension(state): Extension<Arc<AppState<C>>>,
    headers: HeaderMap,
) -> Result<(HeaderMap, ApiResponse<serde_json::Value>), ApiError> {
    let user = guard::require_user(&headers, &state).await?;
    state.sessions.logout(user.id).await?;

    // Cookies are cleared unconditionally once the caller is known.
    let mut response_headers = HeaderMap::new();
    cookies::clear_session_cookies(&mut response_headers, state.cookie_secure)
        .map_err(|e| VidhiveError::Internal(format!("cookie header: {e}")))?;

    Ok((
        response_headers,
        ApiResponse::ok(serde_json::json!({}), "user logged out successfully"),
    ))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

/// Refreshed token pair, mirrored into fresh cookies.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPairBody {
    pub access_token: String,
    pub refresh_token: String,
}

/// POST /api/v1/users/refresh-token
///
/// The presented token is read from the `refreshToken` cookie first,
/// then from the request body.
pub async fn refresh_token<C: Connection>(
    Extension(state): Extension<Arc<AppState<C>>>,
    headers: HeaderMap,
    body: Option<Json<RefreshRequest>>,
) -> Result<(HeaderMap, ApiResponse<TokenPairBody>), ApiError> {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    let presented =
        cookies::refresh_token(&headers, body.refresh_token.as_deref()).unwrap_or_default();

    let out = state.sessions.refresh(&presented).await?;

    let mut response_headers = HeaderMap::new();
    cookies::set_session_cookies(
        &mut response_headers,
        &out.access_token,
        &out.refresh_token,
        &state.auth,
        state.cookie_secure,
    )
    .map_err(|e| VidhiveError::Internal(format!("cookie header: {e}")))?;

    Ok((
        response_headers,
        ApiResponse::ok(
            TokenPairBody {
                access_token: out.access_token,
                refresh_token: out.refresh_token,
            },
            "access token refreshed successfully",
        ),
    ))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

/// POST /api/v1/users/change-password
pub async fn change_password<C: Connection>(
    Extension(state): Extension<Arc<AppState<C>>>,
    headers: HeaderMap,
    body: Option<Json<ChangePasswordRequest>>,
) -> Result<ApiResponse<serde_json::Value>, ApiError> {
    let user = guard::require_user(&headers, &state).await?;
    let body = body.map(|Json(b)| b).unwrap_or_default();

    state
        .sessions
        .change_password(user.id, &body.old_password, &body.new_password)
        .await?;

    Ok(ApiResponse::ok(
        serde_json::json!({}),
        "password changed successfully",
    ))
}
