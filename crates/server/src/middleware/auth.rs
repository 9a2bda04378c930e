//! Authentication extractors and session cookie helpers.
//!
//! The session cookie holds a signed token (see [`crate::services::session`]).
//! Extractors verify it on every request and gate routes by role:
//!
//! - [`RequireSession`] - any logged-in attendee
//! - [`RequireStaff`] - staff or admin
//! - [`RequireAdmin`] - admin only
//!
//! A missing, malformed or expired token yields `401`; a valid token with an
//! insufficient role yields `403`.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde_json::json;

use crate::error::set_sentry_user;
use crate::models::{SESSION_COOKIE, SessionClaims};
use crate::state::AppState;

/// Error returned when a request lacks a valid session or the required role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRejection {
    /// No valid session cookie.
    Unauthorized,
    /// Valid session, insufficient role.
    Forbidden,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized"),
            Self::Forbidden => (StatusCode::FORBIDDEN, "Forbidden"),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Read and verify the session cookie.
fn session_from_parts(parts: &Parts, state: &AppState) -> Result<SessionClaims, AuthRejection> {
    let jar = CookieJar::from_headers(&parts.headers);
    let token = jar
        .get(SESSION_COOKIE)
        .map(Cookie::value)
        .filter(|v| !v.is_empty())
        .ok_or(AuthRejection::Unauthorized)?;

    let claims = state.sessions().verify(token).map_err(|e| {
        tracing::debug!(error = %e, "Rejected session token");
        AuthRejection::Unauthorized
    })?;

    set_sentry_user(&claims.sub, Some(&claims.email));
    Ok(claims)
}

/// Extractor that requires any valid session.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(RequireSession(session): RequireSession) -> impl IntoResponse {
///     format!("Hello, {}!", session.employee_id)
/// }
/// ```
pub struct RequireSession(pub SessionClaims);

impl FromRequestParts<AppState> for RequireSession {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        session_from_parts(parts, state).map(Self)
    }
}

/// Extractor that requires a staff or admin session.
pub struct RequireStaff(pub SessionClaims);

impl FromRequestParts<AppState> for RequireStaff {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let claims = session_from_parts(parts, state)?;
        if !claims.role.can_scan() {
            tracing::warn!(
                attendee_id = %claims.sub,
                role = %claims.role,
                path = %parts.uri.path(),
                "Staff route denied"
            );
            return Err(AuthRejection::Forbidden);
        }
        Ok(Self(claims))
    }
}

/// Extractor that requires an admin session.
pub struct RequireAdmin(pub SessionClaims);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let claims = session_from_parts(parts, state)?;
        if !claims.role.is_admin() {
            tracing::warn!(
                attendee_id = %claims.sub,
                role = %claims.role,
                path = %parts.uri.path(),
                "Admin route denied"
            );
            return Err(AuthRejection::Forbidden);
        }
        Ok(Self(claims))
    }
}

/// Build the cookie carrying a freshly issued session token.
#[must_use]
pub fn session_cookie(token: String, secure: bool, ttl_seconds: i64) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .path("/")
        .max_age(time::Duration::seconds(ttl_seconds))
        .build()
}

/// Build an already-expired session cookie that makes the browser drop it.
#[must_use]
pub fn expired_session_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .path("/")
        .max_age(time::Duration::ZERO)
        .expires(time::OffsetDateTime::UNIX_EPOCH)
        .build()
}
