//! HTTP surface: shared state, router assembly, request tracing.

pub mod cookies;
pub mod envelope;
pub mod guard;
pub mod handlers;

use std::sync::Arc;

use axum::body::Body;
use axum::extract::MatchedPath;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, InvalidHeaderValue};
use axum::http::{HeaderValue, Method, Request};
use axum::routing::{get, patch, post};
use axum::{Extension, Router};
use surrealdb::{Connection, Surreal};
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{Span, info_span};
use vidhive_auth::{AuthConfig, SessionService};
use vidhive_db::repository::SurrealUserRepository;

use handlers::{profile, session};

/// Shared state handed to every handler.
///
/// Generic over the storage engine so the same router serves the
/// remote engine in production and the in-memory engine in tests.
pub struct AppState<C: Connection> {
    pub sessions: SessionService<SurrealUserRepository<C>>,
    pub users: SurrealUserRepository<C>,
    pub auth: AuthConfig,
    /// Marks both session cookies `Secure`.
    pub cookie_secure: bool,
}

impl<C: Connection> AppState<C> {
    pub fn new(db: Surreal<C>, auth: AuthConfig, cookie_secure: bool) -> Self {
        let users = SurrealUserRepository::new(db);
        Self {
            sessions: SessionService::new(users.clone(), auth.clone()),
            users,
            auth,
            cookie_secure,
        }
    }
}

/// Build the router with all user routes mounted under `/api/v1/users`.
pub fn router<C: Connection>(state: AppState<C>) -> Router {
    let state = Arc::new(state);

    Router::new()
        .route("/api/v1/users/register", post(session::register::<C>))
        .route("/api/v1/users/login", post(session::login::<C>))
        .route("/api/v1/users/logout", post(session::logout::<C>))
        .route(
            "/api/v1/users/refresh-token",
            post(session::refresh_token::<C>),
        )
        .route(
            "/api/v1/users/change-password",
            post(session::change_password::<C>),
        )
        .route("/api/v1/users/current-user", get(profile::current_user::<C>))
        .route(
            "/api/v1/users/update-details",
            patch(profile::update_details::<C>),
        )
        .route(
            "/api/v1/users/update-avatar",
            patch(profile::update_avatar::<C>),
        )
        .route(
            "/api/v1/users/update-cover-image",
            patch(profile::update_cover_image::<C>),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(Extension(state)),
        )
}

/// Credentialed CORS layer for one exact origin.
pub fn cors_layer(origin: &str) -> Result<CorsLayer, InvalidHeaderValue> {
    let origin = HeaderValue::from_str(origin)?;
    Ok(CorsLayer::new()
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_methods([Method::GET, Method::POST, Method::PATCH])
        .allow_origin(AllowOrigin::exact(origin))
        .allow_credentials(true))
}

fn make_span(request: &Request<Body>) -> Span {
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
    )
}
