//! Redemption requests, results and audit log entries.

use chrono::{DateTime, Utc};
use serde::Serialize;

use eventpass_core::{BoothId, EmployeeId, Item, RedemptionLogId};

/// A single redemption attempt made by a staff member at a booth.
#[derive(Debug, Clone)]
pub struct RedemptionRequest {
    pub employee_id: EmployeeId,
    pub item: Item,
    pub booth_id: BoothId,
    /// Identity of the staff member or admin performing the scan.
    pub scanned_by: String,
}

/// Quotas left after a successful redemption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuotaSnapshot {
    pub employee_id: EmployeeId,
    pub quota_indomie: u32,
    pub quota_beer: u32,
    pub last_redeem_ts: Option<DateTime<Utc>>,
}

impl QuotaSnapshot {
    /// Remaining quota for the given item.
    #[must_use]
    pub const fn quota(&self, item: Item) -> u32 {
        match item {
            Item::Indomie => self.quota_indomie,
            Item::Beer => self.quota_beer,
        }
    }
}

/// Filters for the audit log listing. Bounds are inclusive.
#[derive(Debug, Clone, Default)]
pub struct LogFilter {
    pub item: Option<Item>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

/// An audit row joined with the attendee it belongs to.
#[derive(Debug, Clone, Serialize)]
pub struct RedemptionLogEntry {
    #[serde(skip)]
    pub id: RedemptionLogId,
    pub ts: DateTime<Utc>,
    pub employee_id: String,
    pub item: Item,
    pub delta: i32,
    pub booth_id: String,
    pub scanned_by: String,
    pub name: String,
    pub email: String,
}
