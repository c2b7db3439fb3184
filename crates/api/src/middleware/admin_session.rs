//! Admin session extractors.
//!
//! A successful login stores a signed token in the [`SESSION_COOKIE`]
//! cookie. JSON endpoints take [`AdminSession`] and answer 401 without it;
//! HTML pages take [`AdminPage`] and redirect to the login form instead.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use lodge_site_core::auth::AdminClaims;

use crate::error::ApiError;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "lodge_admin";

/// Claims of a validated admin session.
#[derive(Debug, Clone)]
pub struct AdminSession(pub AdminClaims);

/// Same as [`AdminSession`], for browser-facing pages.
#[derive(Debug, Clone)]
pub struct AdminPage(pub AdminClaims);

fn session_claims(parts: &Parts, state: &AppState) -> Option<AdminClaims> {
    let jar = CookieJar::from_headers(&parts.headers);
    let token = jar.get(SESSION_COOKIE)?.value().to_string();
    match state.gate().validate_token(&token) {
        Ok(claims) => Some(claims),
        Err(err) => {
            tracing::debug!(error = %err, "rejected admin session");
            None
        }
    }
}

impl FromRequestParts<AppState> for AdminSession {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        session_claims(parts, state)
            .map(AdminSession)
            .ok_or(ApiError::Unauthorized)
    }
}

impl FromRequestParts<AppState> for AdminPage {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        session_claims(parts, state)
            .map(AdminPage)
            .ok_or_else(|| Redirect::to("/admin/login").into_response())
    }
}

/// Cookie carrying a freshly issued session token. It expires with the
/// token.
pub fn session_cookie(token: String, ttl: chrono::Duration, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(ttl.num_seconds()))
        .build()
}

/// Cookie that clears the session on the client.
pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE).path("/").build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookie_expires_with_the_token() {
        let cookie = session_cookie("t".into(), chrono::Duration::hours(12), true);
        assert_eq!(cookie.max_age(), Some(time::Duration::hours(12)));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.http_only(), Some(true));

        let plain = session_cookie("t".into(), chrono::Duration::hours(12), false);
        assert!(!plain.to_string().contains("Secure"));
    }
}
