//! Booth redemption endpoint.

use axum::{Json, extract::State};
use serde::Deserialize;
use tracing::instrument;

use eventpass_core::{BoothId, EmployeeId, Item};

use crate::db::RedemptionRepository;
use crate::error::{AppError, Result};
use crate::extract::ApiJson;
use crate::middleware::RequireStaff;
use crate::models::{QuotaSnapshot, RedemptionRequest};
use crate::state::AppState;

/// Message for a failed redemption, shared by unknown attendees and exhausted quotas.
pub const REDEEM_FAILED: &str = "Attendee not found or quota exhausted";

/// Redemption request body, as sent by a booth scanner.
#[derive(Debug, Deserialize)]
pub struct RedeemBody {
    pub employee_id: EmployeeId,
    pub item: Item,
    pub booth_id: BoothId,
}

/// Redeem one unit of an item for the scanned attendee.
#[instrument(skip_all, fields(scanned_by = %staff.scanned_by()))]
pub async fn redeem(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    ApiJson(body): ApiJson<RedeemBody>,
) -> Result<Json<QuotaSnapshot>> {
    let request = RedemptionRequest {
        employee_id: body.employee_id,
        item: body.item,
        booth_id: body.booth_id,
        scanned_by: staff.scanned_by().to_owned(),
    };

    let Some(snapshot) = RedemptionRepository::new(state.pool())
        .redeem(&request)
        .await?
    else {
        tracing::warn!(
            employee_id = %request.employee_id,
            item = %request.item,
            booth_id = %request.booth_id,
            "Redemption refused"
        );
        return Err(AppError::BadRequest(REDEEM_FAILED.to_string()));
    };

    tracing::info!(
        employee_id = %request.employee_id,
        item = %request.item,
        booth_id = %request.booth_id,
        remaining = snapshot.quota(request.item),
        "Redeemed"
    );

    Ok(Json(snapshot))
}
