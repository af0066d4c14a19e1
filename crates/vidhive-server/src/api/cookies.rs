//! Session cookie construction and extraction.
//!
//! Both tokens travel as named cookies, `accessToken` and
//! `refreshToken`, with `HttpOnly`, `SameSite=Strict`, `Path=/` and a
//! `Max-Age` tracking each token's lifetime. Clearing reuses the same
//! attribute set with an empty value and `Max-Age=0`; mismatched
//! attributes would leave the cookies in place.

use axum::http::header::{AUTHORIZATION, COOKIE, InvalidHeaderValue, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use vidhive_auth::AuthConfig;

pub const ACCESS_COOKIE: &str = "accessToken";
pub const REFRESH_COOKIE: &str = "refreshToken";

/// Append `Set-Cookie` headers for a fresh token pair.
pub fn set_session_cookies(
    headers: &mut HeaderMap,
    access_token: &str,
    refresh_token: &str,
    config: &AuthConfig,
    secure: bool,
) -> Result<(), InvalidHeaderValue> {
    headers.append(
        SET_COOKIE,
        build_cookie(
            ACCESS_COOKIE,
            access_token,
            config.access_token_lifetime_secs,
            secure,
        )?,
    );
    headers.append(
        SET_COOKIE,
        build_cookie(
            REFRESH_COOKIE,
            refresh_token,
            config.refresh_token_lifetime_secs,
            secure,
        )?,
    );
    Ok(())
}

/// Append expired `Set-Cookie` headers for both session cookies.
pub fn clear_session_cookies(
    headers: &mut HeaderMap,
    secure: bool,
) -> Result<(), InvalidHeaderValue> {
    headers.append(SET_COOKIE, build_cookie(ACCESS_COOKIE, "", 0, secure)?);
    headers.append(SET_COOKIE, build_cookie(REFRESH_COOKIE, "", 0, secure)?);
    Ok(())
}

fn build_cookie(
    name: &str,
    value: &str,
    max_age_secs: u64,
    secure: bool,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie =
        format!("{name}={value}; Path=/; HttpOnly; SameSite=Strict; Max-Age={max_age_secs}");
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Value of a named cookie from the request `Cookie` header.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let header = headers.get(COOKIE)?;
    let value = header.to_str().ok()?;
    for pair in value.split(';') {
        let trimmed = pair.trim();
        let mut parts = trimmed.splitn(2, '=');
        let key = parts.next()?.trim();
        let val = parts.next()?.trim();
        if key == name && !val.is_empty() {
            return Some(val.to_string());
        }
    }
    None
}

/// Bearer token from the `Authorization` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Access token for the gate: cookie first, then bearer header.
pub fn access_token(headers: &HeaderMap) -> Option<String> {
    cookie_value(headers, ACCESS_COOKIE).or_else(|| bearer_token(headers))
}

/// Refresh token for the rotation endpoint: cookie first, then the
/// request-body fallback supplied by the handler.
pub fn refresh_token(headers: &HeaderMap, body_token: Option<&str>) -> Option<String> {
    cookie_value(headers, REFRESH_COOKIE).or_else(|| {
        body_token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
    })
}
