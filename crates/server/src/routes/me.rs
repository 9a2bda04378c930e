//! Current attendee endpoints.

use axum::{
    Json,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use crate::db::AttendeeRepository;
use crate::error::{AppError, Result};
use crate::extract::ApiQuery;
use crate::middleware::RequireSession;
use crate::models::Attendee;
use crate::services::qr::{self, QrFormat};
use crate::state::AppState;

/// Query parameters for the QR endpoint.
#[derive(Debug, Deserialize)]
pub struct QrQuery {
    pub format: Option<String>,
}

/// Return the logged-in attendee's current record.
///
/// A session whose attendee has since been deleted is treated as logged out.
#[instrument(skip_all, fields(attendee_id = %session.sub))]
pub async fn me(
    State(state): State<AppState>,
    RequireSession(session): RequireSession,
) -> Result<Json<Attendee>> {
    let attendee = AttendeeRepository::new(state.pool())
        .get_by_id(session.sub)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Unauthorized".to_string()))?;

    Ok(Json(attendee))
}

/// Render the QR code encoding the session's employee ID (PNG unless
/// `format=svg`).
#[instrument(skip_all)]
pub async fn qr_code(
    RequireSession(session): RequireSession,
    ApiQuery(query): ApiQuery<QrQuery>,
) -> Result<Response> {
    let format = query
        .format
        .as_deref()
        .map_or(Ok(QrFormat::default()), str::parse)?;

    let body = qr::render(&session.employee_id, format)?;

    Ok(([(header::CONTENT_TYPE, format.content_type())], body).into_response())
}
