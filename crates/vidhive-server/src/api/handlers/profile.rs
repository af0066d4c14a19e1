//! Profile endpoints for the authenticated user.

use std::sync::Arc;

use axum::http::HeaderMap;
use axum::{Extension, Json};
use serde::Deserialize;
use surrealdb::Connection;
use vidhive_core::VidhiveError;
use vidhive_core::models::user::{PublicUser, UpdateUser};
use vidhive_core::repository::UserRepository;

use crate::api::envelope::{ApiError, ApiResponse};
use crate::api::{AppState, guard};

/// GET /api/v1/users/current-user
pub async fn current_user<C: Connection>(
    Extension(state): Extension<Arc<AppState<C>>>,
    headers: HeaderMap,
) -> Result<ApiResponse<PublicUser>, ApiError> {
    let user = guard::require_user(&headers, &state).await?;
    Ok(ApiResponse::ok(
        user.into(),
        "current user fetched successfully",
    ))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateDetailsRequest {
    pub full_name: String,
    pub email: String,
}

/// PATCH /api/v1/users/update-details
///
/// Both fields are required; image updates go through the dedicated
/// avatar and cover-image endpoints.
pub async fn update_details<C: Connection>(
    Extension(state): Extension<Arc<AppState<C>>>,
    headers: HeaderMap,
    body: Option<Json<UpdateDetailsRequest>>,
) -> Result<ApiResponse<PublicUser>, ApiError> {
    let user = guard::require_user(&headers, &state).await?;
    let body = body.map(|Json(b)| b).unwrap_or_default();

    if body.full_name.trim().is_empty() || body.email.trim().is_empty() {
        return Err(VidhiveError::Validation {
            message: "all fields are required".into(),
        }
        .into());
    }

    let updated = state
        .users
        .update(
            user.id,
            UpdateUser {
                full_name: Some(body.full_name.trim().to_string()),
                email: Some(body.email.trim().to_string()),
                ..UpdateUser::default()
            },
        )
        .await?;

    Ok(ApiResponse::ok(
        updated.into(),
        "account details updated successfully",
    ))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateAvatarRequest {
    pub avatar: String,
}

/// PATCH /api/v1/users/update-avatar
pub async fn update_avatar<C: Connection>(
    Extension(state): Extension<Arc<AppState<C>>>,
    headers: HeaderMap,
    body: Option<Json<UpdateAvatarRequest>>,
) -> Result<ApiResponse<PublicUser>, ApiError> {
    let user = guard::require_user(&headers, &state).await?;
    let body = body.map(|Json(b)| b).unwrap_or_default();

    let avatar = body.avatar.trim();
    if avatar.is_empty() {
        return Err(VidhiveError::Validation {
            message: "avatar file is required".into(),
        }
        .into());
    }

    let updated = state
        .users
        .update(
            user.id,
            UpdateUser {
                avatar_url: Some(avatar.to_string()),
                ..UpdateUser::default()
            },
        )
        .await?;

    Ok(ApiResponse::ok(
        updated.into(),
        "avatar updated successfully",
    ))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateCoverImageRequest {
    pub cover_image: String,
}

/// PATCH /api/v1/users/update-cover-image
pub async fn update_cover_image<C: Connection>(
    Extension(state): Extension<Arc<AppState<C>>>,
    headers: HeaderMap,
    body: Option<Json<UpdateCoverImageRequest>>,
) -> Result<ApiResponse<PublicUser>, ApiError> {
    let user = guard::require_user(&headers, &state).await?;
    let body = body.map(|Json(b)| b).unwrap_or_default();

    let cover_image = body.cover_image.trim();
    if cover_image.is_empty() {
        return Err(VidhiveError::Validation {
            message: "cover image file is required".into(),
        }
        .into());
    }

    let updated = state
        .users
        .update(
            user.id,
            UpdateUser {
                cover_image_url: Some(Some(cover_image.to_string())),
                ..UpdateUser::default()
            },
        )
        .await?;

    Ok(ApiResponse::ok(
        updated.into(),
        "cover image updated successfully",
    ))
}
