//! Login and logout handlers.
//!
//! Login matches an email (case-insensitive) and employee ID (exact) against
//! the roster. There is no password: the pair is printed on the attendee's
//! invitation.

use axum::{Json, extract::State, http::StatusCode};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use eventpass_core::{Email, EmployeeId, Role};

use crate::db::AttendeeRepository;
use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::extract::ApiJson;
use crate::middleware::{expired_session_cookie, session_cookie};
use crate::state::AppState;

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Email,
    pub employee_id: EmployeeId,
}

/// Login response: where the client should navigate next.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub redirect: &'static str,
    pub role: Role,
}

/// Authenticate an attendee and set the session cookie.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>)> {
    let attendee = AttendeeRepository::new(state.pool())
        .find_for_login(&body.email, &body.employee_id)
        .await?
        .ok_or_else(|| {
            tracing::warn!(employee_id = %body.employee_id, "Login failed: no matching attendee");
            AppError::Unauthorized("Invalid credentials".to_string())
        })?;

    let token = state.sessions().issue(&attendee)?;
    let cookie = session_cookie(
        token,
        state.config().secure_cookies(),
        state.sessions().ttl_seconds(),
    );

    set_sentry_user(&attendee.id, Some(attendee.email.as_str()));
    tracing::info!(attendee_id = %attendee.id, role = %attendee.role, "Attendee logged in");

    Ok((
        jar.add(cookie),
        Json(LoginResponse {
            redirect: attendee.role.landing_path(),
            role: attendee.role,
        }),
    ))
}

/// Clear the session cookie.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (StatusCode, CookieJar) {
    clear_sentry_user();
    (
        StatusCode::NO_CONTENT,
        jar.add(expired_session_cookie(state.config().secure_cookies())),
    )
}
