//! Door check-in endpoint.

use axum::{Json, extract::State};
use serde::Deserialize;
use tracing::instrument;

use eventpass_core::EmployeeId;

use crate::db::AttendeeRepository;
use crate::error::{AppError, Result};
use crate::extract::ApiJson;
use crate::middleware::RequireStaff;
use crate::models::Attendee;
use crate::state::AppState;

/// Check-in request body.
#[derive(Debug, Deserialize)]
pub struct CheckinBody {
    pub employee_id: EmployeeId,
}

/// Mark the scanned attendee as checked in. Scanning twice is not an error.
#[instrument(skip_all, fields(scanned_by = %staff.scanned_by()))]
pub async fn checkin(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    ApiJson(body): ApiJson<CheckinBody>,
) -> Result<Json<Attendee>> {
    let attendee = AttendeeRepository::new(state.pool())
        .check_in(&body.employee_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Not found".to_string()))?;

    tracing::info!(employee_id = %attendee.employee_id, "Checked in");

    Ok(Json(attendee))
}
