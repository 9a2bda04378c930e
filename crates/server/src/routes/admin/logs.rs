//! Redemption log listing and CSV export.

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, header},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use tracing::instrument;

use eventpass_core::Item;

use crate::db::RedemptionRepository;
use crate::error::{AppError, INVALID_INPUT, Result};
use crate::extract::ApiQuery;
use crate::middleware::RequireAdmin;
use crate::models::LogFilter;
use crate::services::export;
use crate::state::AppState;

/// Raw log query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct LogQuery {
    pub item: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub format: Option<String>,
}

/// Parse a time bound given either as RFC 3339 or as a bare `YYYY-MM-DD`
/// date (midnight UTC).
fn parse_bound(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| dt.and_utc())
        })
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl LogQuery {
    fn filter(&self) -> Result<LogFilter> {
        let invalid = || AppError::BadRequest(INVALID_INPUT.to_string());

        let item = non_empty(self.item.as_deref())
            .map(str::parse::<Item>)
            .transpose()
            .map_err(|_| invalid())?;
        let from = non_empty(self.from.as_deref())
            .map(|v| parse_bound(v).ok_or_else(invalid))
            .transpose()?;
        let to = non_empty(self.to.as_deref())
            .map(|v| parse_bound(v).ok_or_else(invalid))
            .transpose()?;

        Ok(LogFilter { item, from, to })
    }

    fn wants_csv(&self, headers: &HeaderMap) -> bool {
        self.format.as_deref() == Some("csv")
            || headers
                .get(header::ACCEPT)
                .and_then(|v| v.to_str().ok())
                .is_some_and(|accept| accept.contains("text/csv"))
    }
}

/// List redemption logs as JSON, or download them as CSV.
#[instrument(skip_all, fields(admin = %admin.scanned_by()))]
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    headers: HeaderMap,
    ApiQuery(query): ApiQuery<LogQuery>,
) -> Result<Response> {
    let filter = query.filter()?;
    let entries = RedemptionRepository::new(state.pool())
        .list(&filter)
        .await?;

    if query.wants_csv(&headers) {
        tracing::info!(rows = entries.len(), "Exporting redemption log as CSV");
        let csv = export::logs_to_csv(&entries)?;
        return Ok((
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"logs.csv\"",
                ),
            ],
            csv,
        )
            .into_response());
    }

    Ok(Json(entries).into_response())
}
