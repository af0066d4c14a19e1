//! Uniform response envelope and error translation.
//!
//! Every endpoint answers with the same body shape,
//! `{ statusCode, data, message, success }`, on success and on
//! failure alike. Failures carry `data: null` and `success: false`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::error;
use vidhive_core::VidhiveError;

/// Body shape shared by every endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T: Serialize> {
    #[serde(skip)]
    status: StatusCode,
    status_code: u16,
    data: T,
    message: String,
    success: bool,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(status: StatusCode, data: T, message: &str) -> Self {
        Self {
            status,
            status_code: status.as_u16(),
            data,
            message: message.to_string(),
            success: status.is_success(),
        }
    }

    /// 200 envelope.
    pub fn ok(data: T, message: &str) -> Self {
        Self::new(StatusCode::OK, data, message)
    }

    /// 201 envelope.
    pub fn created(data: T, message: &str) -> Self {
        Self::new(StatusCode::CREATED, data, message)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status;
        (status, Json(self)).into_response()
    }
}

/// Translation of the error taxonomy into enveloped HTTP responses.
///
/// Handlers return `Result<_, ApiError>` and propagate domain errors
/// with `?`; nothing reaches the client untranslated.
pub struct ApiError(pub VidhiveError);

impl From<VidhiveError> for ApiError {
    fn from(err: VidhiveError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self.0 {
            VidhiveError::Validation { message } => (StatusCode::BAD_REQUEST, message),
            VidhiveError::Unauthorized { reason } => (StatusCode::UNAUTHORIZED, reason),
            VidhiveError::NotFound { entity, .. } => {
                (StatusCode::NOT_FOUND, format!("{entity} does not exist"))
            }
            VidhiveError::Conflict { entity } => {
                (StatusCode::CONFLICT, format!("{entity} already exists"))
            }
            // Internal faults are logged with detail and reported with
            // a generic message only.
            err => {
                error!(error = %err, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        ApiResponse::new(status, serde_json::Value::Null, &message).into_response()
    }
}
