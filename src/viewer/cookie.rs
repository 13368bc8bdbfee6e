//! Reading, writing and extending the private viewer cookie.

use std::cmp::max;

use axum::{http::header::SET_COOKIE, response::IntoResponse};
use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, Key, SameSite},
};
use time::{Duration, OffsetDateTime};

use crate::{
    Error,
    viewer::{Viewer, token::Token},
};

/// The name of the cookie that holds the encrypted [Token].
pub const COOKIE_VIEWER: &str = "viewer";

/// How long a viewer cookie stays valid after the viewer's latest request.
pub const DEFAULT_COOKIE_DURATION: Duration = Duration::minutes(30);

/// Add the viewer cookie to the cookie jar, expiring `duration` from now.
///
/// # Errors
///
/// Returns [Error::JSONSerializationError] if the token cannot be serialized.
pub fn set_viewer_cookie(
    jar: PrivateCookieJar,
    viewer: &Viewer,
    duration: Duration,
) -> Result<PrivateCookieJar, Error> {
    let expiry = OffsetDateTime::now_utc() + duration;

    set_token_cookie(jar, &Token::new(viewer, expiry))
}

fn set_token_cookie(jar: PrivateCookieJar, token: &Token) -> Result<PrivateCookieJar, Error> {
    let token_string = serde_json::to_string(token).map_err(|error| {
        tracing::error!("Could not serialize viewer token: {error}");
        Error::JSONSerializationError(error.to_string())
    })?;

    Ok(jar.add(
        Cookie::build((COOKIE_VIEWER, token_string))
            .expires(token.expires_at)
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true)
            .path("/"),
    ))
}

/// Encrypt a viewer cookie with `key` and return it as a `name=value` pair,
/// ready to be sent in a `Cookie` header.
///
/// This is how the session manager (or a developer) hands a viewer to the server.
///
/// # Errors
///
/// Returns [Error::JSONSerializationError] if the token cannot be serialized.
pub fn encode_viewer_cookie(key: &Key, viewer: &Viewer, duration: Duration) -> Result<String, Error> {
    let jar = set_viewer_cookie(PrivateCookieJar::new(key.clone()), viewer, duration)?;
    let response = jar.into_response();

    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|header| header.to_str().ok())
        .filter_map(|header| header.split(';').next())
        .find(|pair| pair.starts_with(COOKIE_VIEWER))
        .map(str::to_owned)
        .ok_or(Error::CookieMissing)
}

/// Get the token from the viewer cookie.
///
/// # Errors
///
/// Returns:
/// - [Error::CookieMissing] if there is no viewer cookie (the viewer is signed out).
/// - [Error::InvalidViewer] if the cookie cannot be decoded or has expired.
pub(super) fn get_token_from_cookies(jar: &PrivateCookieJar) -> Result<Token, Error> {
    let cookie = jar.get(COOKIE_VIEWER).ok_or(Error::CookieMissing)?;

    let token: Token = serde_json::from_str(cookie.value()).map_err(|error| {
        tracing::warn!("Could not decode viewer token: {error}");
        Error::InvalidViewer
    })?;

    if token.expires_at <= OffsetDateTime::now_utc() {
        return Err(Error::InvalidViewer);
    }

    Ok(token)
}

/// Push the expiry of the viewer cookie to the later of its current expiry
/// and now plus `duration`.
///
/// # Errors
///
/// The cookie jar is not modified if an error is returned.
///
/// Returns:
/// - [Error::CookieMissing] or [Error::InvalidViewer] if there is no valid viewer cookie.
/// - [Error::InvalidDateFormat] if the new expiry would overflow.
pub(super) fn extend_viewer_cookie_duration_if_needed(
    jar: PrivateCookieJar,
    duration: Duration,
) -> Result<PrivateCookieJar, Error> {
    let mut token = get_token_from_cookies(&jar)?;

    let now = OffsetDateTime::now_utc();
    let new_expiry = now.checked_add(duration).ok_or_else(|| {
        Error::InvalidDateFormat(
            "expiry overflowed".to_owned(),
            format!("{now} + {duration}"),
        )
    })?;

    token.expires_at = max(token.expires_at, new_expiry);

    set_token_cookie(jar, &token)
}
