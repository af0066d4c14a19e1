//! End-to-end tests for the HTTP surface, over the in-memory engine.

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::header::{CONTENT_TYPE, SET_COOKIE};
use axum::http::{Request, Response, StatusCode};
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::{Value, json};
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use tower::ServiceExt;
use vidhive_auth::{AuthConfig, TokenClaims};
use vidhive_server::api::{self, AppState};

fn test_auth_config() -> AuthConfig {
    AuthConfig {
        access_token_secret: "access-secret-for-tests".into(),
        refresh_token_secret: "refresh-secret-for-tests".into(),
        access_token_lifetime_secs: 900,
        refresh_token_lifetime_secs: 864_000,
        jwt_issuer: "vidhive-test".into(),
        pepper: None,
    }
}

/// Router over a fresh in-memory database, cookies not marked Secure.
async fn test_app() -> Router {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    vidhive_db::run_migrations(&db).await.unwrap();

    api::router(AppState::new(db, test_auth_config(), false))
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    headers: &[(&str, String)],
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, value.as_str());
    }
    let request = match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

async fn body_json(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Value of the named cookie from the response's Set-Cookie headers.
fn set_cookie_value(response: &Response<Body>, name: &str) -> Option<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .find_map(|header| {
            let cookie = header.to_str().ok()?;
            let (pair, _) = cookie.split_once(';')?;
            let (key, value) = pair.split_once('=')?;
            (key == name).then(|| value.to_string())
        })
}

/// Full Set-Cookie header string for the named cookie.
fn set_cookie_header(response: &Response<Body>, name: &str) -> Option<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .find_map(|header| {
            let cookie = header.to_str().ok()?;
            cookie
                .starts_with(&format!("{name}="))
                .then(|| cookie.to_string())
        })
}

fn register_payload() -> Value {
    json!({
        "fullName": "Alice Example",
        "email": "alice@example.com",
        "userName": "alice",
        "password": "correct-horse-battery",
        "avatar": "https://cdn.example.com/avatars/alice.png",
    })
}

async fn register_alice(app: &Router) {
    let response = send(
        app,
        "POST",
        "/api/v1/users/register",
        &[],
        Some(register_payload()),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

/// Login and return the (access, refresh) pair from the cookies.
async fn login_alice(app: &Router) -> (String, String) {
    let response = send(
        app,
        "POST",
        "/api/v1/users/login",
        &[],
        Some(json!({ "userName": "alice", "password": "correct-horse-battery" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let access = set_cookie_value(&response, "accessToken").unwrap();
    let refresh = set_cookie_value(&response, "refreshToken").unwrap();
    (access, refresh)
}

fn bearer(token: &str) -> (&'static str, String) {
    ("authorization", format!("Bearer {token}"))
}

// -----------------------------------------------------------------------
// Register
// -----------------------------------------------------------------------

#[tokio::test]
async fn register_returns_created_envelope() {
    let app = test_app().await;

    let response = send(
        &app,
        "POST",
        "/api/v1/users/register",
        &[],
        Some(register_payload()),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    assert_eq!(body["statusCode"], 201);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "user registered successfully");
    assert_eq!(body["data"]["userName"], "alice");
    assert_eq!(body["data"]["email"], "alice@example.com");
    assert_eq!(
        body["data"]["avatar"],
        "https://cdn.example.com/avatars/alice.png"
    );
    // Secrets are structurally absent from the outward projection.
    assert!(body["data"].get("password").is_none());
    assert!(body["data"].get("passwordHash").is_none());
    assert!(body["data"].get("refreshToken").is_none());
}

#[tokio::test]
async fn register_with_missing_field_is_bad_request() {
    let app = test_app().await;

    let mut payload = register_payload();
    payload.as_object_mut().unwrap().remove("password");

    let response = send(&app, "POST", "/api/v1/users/register", &[], Some(payload)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["statusCode"], 400);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "all fields are required");
    assert_eq!(body["data"], Value::Null);
}

#[tokio::test]
async fn register_without_avatar_is_bad_request() {
    let app = test_app().await;

    let mut payload = register_payload();
    payload.as_object_mut().unwrap().remove("avatar");

    let response = send(&app, "POST", "/api/v1/users/register", &[], Some(payload)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["message"], "avatar file is required");
}

#[tokio::test]
async fn register_duplicate_email_conflicts() {
    let app = test_app().await;
    register_alice(&app).await;

    let mut payload = register_payload();
    payload["userName"] = json!("alice2");

    let response = send(&app, "POST", "/api/v1/users/register", &[], Some(payload)).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body = body_json(response).await;
    assert_eq!(body["statusCode"], 409);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "user with this email already exists");
}

#[tokio::test]
async fn malformed_json_body_is_bad_request() {
    let app = test_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/users/register")
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    // An unreadable body degrades to empty fields.
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["message"], "all fields are required");
}

// -----------------------------------------------------------------------
// Login
// -----------------------------------------------------------------------

#[tokio::test]
async fn login_sets_both_cookies_and_returns_tokens() {
    let app = test_app().await;
    register_alice(&app).await;

    let response = send(
        &app,
        "POST",
        "/api/v1/users/login",
        &[],
        Some(json!({ "userName": "alice", "password": "correct-horse-battery" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let access_cookie = set_cookie_header(&response, "accessToken").unwrap();
    let refresh_cookie = set_cookie_header(&response, "refreshToken").unwrap();
    for cookie in [&access_cookie, &refresh_cookie] {
        assert!(cookie.contains("HttpOnly"), "missing HttpOnly: {cookie}");
        assert!(
            cookie.contains("SameSite=Strict"),
            "missing SameSite: {cookie}"
        );
        assert!(cookie.contains("Path=/"), "missing Path: {cookie}");
        // Not Secure for the plain-HTTP test configuration.
        assert!(!cookie.contains("Secure"), "unexpected Secure: {cookie}");
    }
    assert!(access_cookie.contains("Max-Age=900"));
    assert!(refresh_cookie.contains("Max-Age=864000"));

    // The body carries the same tokens as the cookies.
    let access_value = set_cookie_value(&response, "accessToken").unwrap();
    let refresh_value = set_cookie_value(&response, "refreshToken").unwrap();
    let body = body_json(response).await;
    assert_eq!(body["message"], "user logged in successfully");
    assert_eq!(body["data"]["user"]["userName"], "alice");
    assert_eq!(body["data"]["accessToken"], access_value);
    assert_eq!(body["data"]["refreshToken"], refresh_value);
    assert!(body["data"]["user"].get("passwordHash").is_none());
}

#[tokio::test]
async fn login_unknown_user_is_not_found() {
    let app = test_app().await;

    let response = send(
        &app,
        "POST",
        "/api/v1/users/login",
        &[],
        Some(json!({ "userName": "nobody", "password": "whatever" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = body_json(response).await;
    assert_eq!(body["statusCode"], 404);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn login_wrong_password_is_unauthorized() {
    let app = test_app().await;
    register_alice(&app).await;

    let response = send(
        &app,
        "POST",
        "/api/v1/users/login",
        &[],
        Some(json!({ "userName": "alice", "password": "wrong" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "invalid user credentials");
}

// -----------------------------------------------------------------------
// Refresh rotation
// -----------------------------------------------------------------------

#[tokio::test]
async fn refresh_rotation_end_to_end() {
    let app = test_app().await;
    register_alice(&app).await;
    let (_, first_refresh) = login_alice(&app).await;

    // Refresh with the cookie: succeeds and rotates.
    let response = send(
        &app,
        "POST",
        "/api/v1/users/refresh-token",
        &[("cookie", format!("refreshToken={first_refresh}"))],
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let second_refresh = set_cookie_value(&response, "refreshToken").unwrap();
    assert_ne!(second_refresh, first_refresh);
    let body = body_json(response).await;
    assert_eq!(body["data"]["refreshToken"], second_refresh);

    // Replaying the rotated-out token fails.
    let response = send(
        &app,
        "POST",
        "/api/v1/users/refresh-token",
        &[("cookie", format!("refreshToken={first_refresh}"))],
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "refresh token is expired or already used");

    // The replacement still works.
    let response = send(
        &app,
        "POST",
        "/api/v1/users/refresh-token",
        &[("cookie", format!("refreshToken={second_refresh}"))],
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn refresh_accepts_body_token_when_cookie_absent() {
    let app = test_app().await;
    register_alice(&app).await;
    let (_, refresh) = login_alice(&app).await;

    let response = send(
        &app,
        "POST",
        "/api/v1/users/refresh-token",
        &[],
        Some(json!({ "refreshToken": refresh })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn refresh_without_token_is_unauthorized() {
    let app = test_app().await;

    let response = send(&app, "POST", "/api/v1/users/refresh-token", &[], None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body["statusCode"], 401);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "refresh token is required");
}

// -----------------------------------------------------------------------
// Access-token gate
// -----------------------------------------------------------------------

#[tokio::test]
async fn current_user_requires_token() {
    let app = test_app().await;

    let response = send(&app, "GET", "/api/v1/users/current-user", &[], None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body["message"], "unauthorized request");
}

#[tokio::test]
async fn current_user_accepts_bearer_and_cookie() {
    let app = test_app().await;
    register_alice(&app).await;
    let (access, _) = login_alice(&app).await;

    let response = send(
        &app,
        "GET",
        "/api/v1/users/current-user",
        &[bearer(&access)],
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["userName"], "alice");

    let response = send(
        &app,
        "GET",
        "/api/v1/users/current-user",
        &[("cookie", format!("accessToken={access}"))],
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn gate_rejects_refresh_token_as_access() {
    let app = test_app().await;
    register_alice(&app).await;
    let (_, refresh) = login_alice(&app).await;

    let response = send(
        &app,
        "GET",
        "/api/v1/users/current-user",
        &[bearer(&refresh)],
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn gate_rejects_garbage_token() {
    let app = test_app().await;

    let response = send(
        &app,
        "GET",
        "/api/v1/users/current-user",
        &[bearer("not-a-jwt")],
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn gate_rejects_expired_access_token() {
    let app = test_app().await;

    let response = send(
        &app,
        "POST",
        "/api/v1/users/register",
        &[],
        Some(register_payload()),
    )
    .await;
    let user_id = body_json(response).await["data"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    // Signed with the right secret for a real account, but an hour
    // past expiry, well beyond the decoder's leeway.
    let config = test_auth_config();
    let now = Utc::now().timestamp();
    let claims = TokenClaims {
        sub: user_id,
        iss: config.jwt_issuer.clone(),
        iat: now - 7200,
        exp: now - 3600,
        jti: "backdated".into(),
    };
    let expired = jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.access_token_secret.as_bytes()),
    )
    .unwrap();

    let response = send(
        &app,
        "GET",
        "/api/v1/users/current-user",
        &[bearer(&expired)],
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body["statusCode"], 401);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "token has expired");
    assert_eq!(body["data"], Value::Null);
}

// -----------------------------------------------------------------------
// Logout
// -----------------------------------------------------------------------

#[tokio::test]
async fn logout_clears_cookies_and_revokes_session() {
    let app = test_app().await;
    register_alice(&app).await;
    let (access, refresh) = login_alice(&app).await;

    let response = send(
        &app,
        "POST",
        "/api/v1/users/logout",
        &[bearer(&access)],
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let access_cookie = set_cookie_header(&response, "accessToken").unwrap();
    let refresh_cookie = set_cookie_header(&response, "refreshToken").unwrap();
    assert!(access_cookie.starts_with("accessToken=;"));
    assert!(access_cookie.contains("Max-Age=0"));
    assert!(refresh_cookie.starts_with("refreshToken=;"));
    assert!(refresh_cookie.contains("Max-Age=0"));

    // The stored refresh token is gone.
    let response = send(
        &app,
        "POST",
        "/api/v1/users/refresh-token",
        &[("cookie", format!("refreshToken={refresh}"))],
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_requires_authentication() {
    let app = test_app().await;

    let response = send(&app, "POST", "/api/v1/users/logout", &[], None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// -----------------------------------------------------------------------
// Password change
// -----------------------------------------------------------------------

#[tokio::test]
async fn change_password_over_http() {
    let app = test_app().await;
    register_alice(&app).await;
    let (access, _) = login_alice(&app).await;

    let response = send(
        &app,
        "POST",
        "/api/v1/users/change-password",
        &[bearer(&access)],
        Some(json!({
            "oldPassword": "correct-horse-battery",
            "newPassword": "new-password-123",
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["message"], "password changed successfully");

    // Old password no longer logs in.
    let response = send(
        &app,
        "POST",
        "/api/v1/users/login",
        &[],
        Some(json!({ "userName": "alice", "password": "correct-horse-battery" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // New one does.
    let response = send(
        &app,
        "POST",
        "/api/v1/users/login",
        &[],
        Some(json!({ "userName": "alice", "password": "new-password-123" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn change_password_with_wrong_old_password_is_unauthorized() {
    let app = test_app().await;
    register_alice(&app).await;
    let (access, _) = login_alice(&app).await;

    let response = send(
        &app,
        "POST",
        "/api/v1/users/change-password",
        &[bearer(&access)],
        Some(json!({ "oldPassword": "wrong", "newPassword": "next" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body["message"], "invalid old password");
}

// -----------------------------------------------------------------------
// Profile updates
// -----------------------------------------------------------------------

#[tokio::test]
async fn update_details_roundtrip() {
    let app = test_app().await;
    register_alice(&app).await;
    let (access, _) = login_alice(&app).await;

    let response = send(
        &app,
        "PATCH",
        "/api/v1/users/update-details",
        &[bearer(&access)],
        Some(json!({ "fullName": "Alice B. Example", "email": "alice.b@example.com" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["fullName"], "Alice B. Example");
    assert_eq!(body["data"]["email"], "alice.b@example.com");

    // The change is visible on the next read.
    let response = send(
        &app,
        "GET",
        "/api/v1/users/current-user",
        &[bearer(&access)],
        None,
    )
    .await;
    let body = body_json(response).await;
    assert_eq!(body["data"]["fullName"], "Alice B. Example");
}

#[tokio::test]
async fn update_details_requires_both_fields() {
    let app = test_app().await;
    register_alice(&app).await;
    let (access, _) = login_alice(&app).await;

    let response = send(
        &app,
        "PATCH",
        "/api/v1/users/update-details",
        &[bearer(&access)],
        Some(json!({ "fullName": "Only Name" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_avatar_and_cover_image() {
    let app = test_app().await;
    register_alice(&app).await;
    let (access, _) = login_alice(&app).await;

    let response = send(
        &app,
        "PATCH",
        "/api/v1/users/update-avatar",
        &[bearer(&access)],
        Some(json!({ "avatar": "https://cdn.example.com/avatars/alice-v2.png" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(
        body["data"]["avatar"],
        "https://cdn.example.com/avatars/alice-v2.png"
    );

    let response = send(
        &app,
        "PATCH",
        "/api/v1/users/update-cover-image",
        &[bearer(&access)],
        Some(json!({ "coverImage": "https://cdn.example.com/covers/alice.png" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(
        body["data"]["coverImage"],
        "https://cdn.example.com/covers/alice.png"
    );
}

#[tokio::test]
async fn update_avatar_with_blank_reference_is_bad_request() {
    let app = test_app().await;
    register_alice(&app).await;
    let (access, _) = login_alice(&app).await;

    let response = send(
        &app,
        "PATCH",
        "/api/v1/users/update-avatar",
        &[bearer(&access)],
        Some(json!({ "avatar": "   " })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["message"], "avatar file is required");
}
