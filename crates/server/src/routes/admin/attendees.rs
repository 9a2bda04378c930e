//! Attendee management for admins.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use eventpass_core::AttendeeId;

use crate::db::{AttendeeRepository, RepositoryError};
use crate::error::{AppError, INVALID_INPUT, Result};
use crate::extract::{ApiJson, ApiQuery};
use crate::middleware::RequireAdmin;
use crate::models::{Attendee, AttendeePatch, AttendeeSearch, NewAttendee, PageMeta};
use crate::state::AppState;

/// Raw listing parameters. `q` is accepted as an alias of `search`.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
    pub q: Option<String>,
    pub page: Option<String>,
    #[serde(rename = "pageSize", alias = "page_size")]
    pub page_size: Option<String>,
}

impl ListQuery {
    fn into_search(self) -> AttendeeSearch {
        AttendeeSearch::from_raw(
            self.search.as_deref().or(self.q.as_deref()),
            self.page.as_deref(),
            self.page_size.as_deref(),
        )
    }
}

/// One page of attendees.
#[derive(Debug, Serialize)]
pub struct AttendeeList {
    pub data: Vec<Attendee>,
    pub meta: PageMeta,
}

/// Single-attendee envelope.
#[derive(Debug, Serialize)]
pub struct AttendeeData {
    pub data: Attendee,
}

/// Parse a path ID. Malformed IDs cannot match any attendee.
fn parse_id(raw: &str) -> Result<AttendeeId> {
    raw.parse()
        .map_err(|_| AppError::NotFound("Not found".to_string()))
}

/// List attendees with search and pagination.
#[instrument(skip_all)]
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> Result<Json<AttendeeList>> {
    let search = query.into_search();
    let (data, total) = AttendeeRepository::new(state.pool()).list(&search).await?;

    Ok(Json(AttendeeList {
        data,
        meta: search.meta(total),
    }))
}

/// Create an attendee.
#[instrument(skip_all, fields(admin = %admin.scanned_by()))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiJson(body): ApiJson<NewAttendee>,
) -> Result<(StatusCode, Json<AttendeeData>)> {
    let new = body
        .validate()
        .map_err(|_| AppError::BadRequest(INVALID_INPUT.to_string()))?;

    let attendee = AttendeeRepository::new(state.pool())
        .create(&new)
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => {
                AppError::Conflict("Employee ID already exists".to_string())
            }
            other => other.into(),
        })?;

    tracing::info!(
        attendee_id = %attendee.id,
        employee_id = %attendee.employee_id,
        "Attendee created"
    );

    Ok((StatusCode::CREATED, Json(AttendeeData { data: attendee })))
}

/// Partially update an attendee.
#[instrument(skip_all, fields(admin = %admin.scanned_by(), attendee_id = %id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<AttendeePatch>,
) -> Result<Json<AttendeeData>> {
    let id = parse_id(&id)?;

    if body.is_empty() {
        return Err(AppError::BadRequest(
            "No patchable fields provided".to_string(),
        ));
    }
    let patch = body
        .validate()
        .map_err(|_| AppError::BadRequest(INVALID_INPUT.to_string()))?;

    let attendee = AttendeeRepository::new(state.pool())
        .update(id, &patch)
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => {
                AppError::Conflict("Employee ID already exists".to_string())
            }
            other => other.into(),
        })?;

    tracing::info!("Attendee updated");

    Ok(Json(AttendeeData { data: attendee }))
}

/// Delete an attendee that has no redemption history.
#[instrument(skip_all, fields(admin = %admin.scanned_by(), attendee_id = %id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let id = parse_id(&id)?;

    AttendeeRepository::new(state.pool())
        .delete(id)
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => AppError::Conflict(
                "Attendee has redemption history and cannot be deleted".to_string(),
            ),
            other => other.into(),
        })?;

    tracing::info!("Attendee deleted");

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_q_is_search_alias() {
        let query = ListQuery {
            q: Some("budi".to_string()),
            ..ListQuery::default()
        };
        assert_eq!(query.into_search().term.as_deref(), Some("budi"));
    }

    #[test]
    fn test_search_wins_over_q() {
        let query = ListQuery {
            search: Some("rina".to_string()),
            q: Some("budi".to_string()),
            ..ListQuery::default()
        };
        assert_eq!(query.into_search().term.as_deref(), Some("rina"));
    }

    #[test]
    fn test_malformed_id_is_not_found() {
        assert!(matches!(parse_id("42"), Err(AppError::NotFound(_))));
    }
}
