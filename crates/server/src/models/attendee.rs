//! Attendee domain models and admin request payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use eventpass_core::{AttendeeId, Email, EmployeeId, Item, Role};

/// Highest quota an admin may assign for a single item.
pub const MAX_QUOTA: u32 = 10_000;

/// Maximum length of an attendee's display name.
pub const MAX_NAME_LENGTH: usize = 200;

/// An attendee record.
#[derive(Debug, Clone, Serialize)]
pub struct Attendee {
    pub id: AttendeeId,
    pub employee_id: EmployeeId,
    pub email: Email,
    pub name: String,
    pub role: Role,
    pub quota_indomie: u32,
    pub quota_beer: u32,
    pub checked_in: bool,
    pub last_redeem_ts: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Attendee {
    /// Remaining quota for the given item.
    #[must_use]
    pub const fn quota(&self, item: Item) -> u32 {
        match item {
            Item::Indomie => self.quota_indomie,
            Item::Beer => self.quota_beer,
        }
    }
}

/// Trim a display name, rejecting blank or oversized values.
///
/// # Errors
///
/// Returns a message describing why the name was rejected.
pub fn clean_name(raw: &str) -> Result<String, &'static str> {
    let name = raw.trim();
    if name.is_empty() {
        return Err("name cannot be empty");
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err("name is too long");
    }
    Ok(name.to_owned())
}

fn check_quota(value: Option<u32>) -> Result<(), &'static str> {
    match value {
        Some(q) if q > MAX_QUOTA => Err("quota is too large"),
        _ => Ok(()),
    }
}

/// Payload for creating an attendee from the admin API or the CLI.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAttendee {
    pub employee_id: EmployeeId,
    pub email: Email,
    pub name: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default, alias = "indomie_quota")]
    pub quota_indomie: Option<u32>,
    #[serde(default, alias = "beer_quota")]
    pub quota_beer: Option<u32>,
}

impl NewAttendee {
    /// Normalize the name and check quota bounds.
    ///
    /// # Errors
    ///
    /// Returns a message describing the first invalid field.
    pub fn validate(mut self) -> Result<Self, &'static str> {
        self.name = clean_name(&self.name)?;
        check_quota(self.quota_indomie)?;
        check_quota(self.quota_beer)?;
        Ok(self)
    }

    /// Starting quota for `item`, falling back to the item default.
    #[must_use]
    pub fn initial_quota(&self, item: Item) -> u32 {
        match item {
            Item::Indomie => self.quota_indomie,
            Item::Beer => self.quota_beer,
        }
        .unwrap_or_else(|| item.default_quota())
    }
}

/// Partial update of an attendee. Absent fields are left unchanged.
///
/// Quotas are unsigned, so negative values are rejected while the body is parsed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttendeePatch {
    pub employee_id: Option<EmployeeId>,
    pub email: Option<Email>,
    pub name: Option<String>,
    pub role: Option<Role>,
    #[serde(alias = "indomie_quota")]
    pub quota_indomie: Option<u32>,
    #[serde(alias = "beer_quota")]
    pub quota_beer: Option<u32>,
    #[serde(alias = "checkin")]
    pub checked_in: Option<bool>,
}

impl AttendeePatch {
    /// Whether the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.employee_id.is_none()
            && self.email.is_none()
            && self.name.is_none()
            && self.role.is_none()
            && self.quota_indomie.is_none()
            && self.quota_beer.is_none()
            && self.checked_in.is_none()
    }

    /// Normalize the name and check quota bounds.
    ///
    /// # Errors
    ///
    /// Returns a message describing the first invalid field.
    pub fn validate(mut self) -> Result<Self, &'static str> {
        if let Some(name) = self.name.as_deref() {
            self.name = Some(clean_name(name)?);
        }
        check_quota(self.quota_indomie)?;
        check_quota(self.quota_beer)?;
        Ok(self)
    }
}

/// One row of an imported roster. Quotas are never touched by imports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    pub employee_id: EmployeeId,
    pub email: Email,
    pub name: String,
    pub role: Role,
}

/// Default page size for attendee listings.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Largest page size a caller may request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Normalized pagination and search parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendeeSearch {
    /// Trimmed search term; `None` when blank.
    pub term: Option<String>,
    /// 1-based page number.
    pub page: u32,
    /// Rows per page, between 1 and [`MAX_PAGE_SIZE`].
    pub page_size: u32,
}

impl Default for AttendeeSearch {
    fn default() -> Self {
        Self {
            term: None,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl AttendeeSearch {
    /// Build search parameters from raw query values.
    ///
    /// Unparseable or out-of-range numbers fall back to the defaults; page sizes
    /// above the maximum are clamped.
    #[must_use]
    pub fn from_raw(term: Option<&str>, page: Option<&str>, page_size: Option<&str>) -> Self {
        let term = term.map(str::trim).filter(|t| !t.is_empty()).map(str::to_owned);

        let page = page
            .and_then(|p| p.trim().parse::<u32>().ok())
            .filter(|&p| p >= 1)
            .unwrap_or(1);

        let page_size = page_size
            .and_then(|p| p.trim().parse::<u32>().ok())
            .filter(|&p| p >= 1)
            .map_or(DEFAULT_PAGE_SIZE, |p| p.min(MAX_PAGE_SIZE));

        Self {
            term,
            page,
            page_size,
        }
    }

    /// Row offset of the first item on this page.
    #[must_use]
    pub fn offset(&self) -> i64 {
        (i64::from(self.page) - 1) * i64::from(self.page_size)
    }

    /// Pagination metadata for a result set of `total` rows.
    #[must_use]
    pub fn meta(&self, total: i64) -> PageMeta {
        let size = i64::from(self.page_size);
        let total_pages = ((total + size - 1) / size).max(1);
        PageMeta {
            total,
            page: self.page,
            page_size: self.page_size,
            total_pages,
            has_next: i64::from(self.page) < total_pages,
            has_prev: self.page > 1,
            search: self.term.clone(),
        }
    }
}

/// Pagination metadata returned alongside attendee listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: i64,
    pub has_next: bool,
    pub has_prev: bool,
    pub search: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_search_defaults() {
        let search = AttendeeSearch::from_raw(None, None, None);
        assert_eq!(search, AttendeeSearch::default());
        assert_eq!(search.offset(), 0);
    }

    #[test]
    fn test_search_sanitizes_numbers() {
        let search = AttendeeSearch::from_raw(Some("  "), Some("0"), Some("abc"));
        assert_eq!(search.term, None);
        assert_eq!(search.page, 1);
        assert_eq!(search.page_size, DEFAULT_PAGE_SIZE);

        let search = AttendeeSearch::from_raw(Some(" rina "), Some("3"), Some("500"));
        assert_eq!(search.term.as_deref(), Some("rina"));
        assert_eq!(search.page, 3);
        assert_eq!(search.page_size, MAX_PAGE_SIZE);
        assert_eq!(search.offset(), 200);
    }

    #[test]
    fn test_page_meta() {
        let search = AttendeeSearch::from_raw(None, Some("2"), Some("10"));
        let meta = search.meta(25);
        assert_eq!(meta.total_pages, 3);
        assert!(meta.has_next);
        assert!(meta.has_prev);

        let empty = AttendeeSearch::default().meta(0);
        assert_eq!(empty.total_pages, 1);
        assert!(!empty.has_next);
        assert!(!empty.has_prev);
    }

    #[test]
    fn test_page_meta_serializes_camel_case() {
        let json = serde_json::to_value(AttendeeSearch::default().meta(5)).unwrap();
        assert_eq!(json["pageSize"], 20);
        assert_eq!(json["totalPages"], 1);
        assert_eq!(json["hasNext"], false);
        assert!(json["search"].is_null());
    }

    #[test]
    fn test_new_attendee_defaults() {
        let new: NewAttendee = serde_json::from_value(serde_json::json!({
            "employee_id": "E1",
            "email": "A@Example.com",
            "name": "  Ayu  ",
        }))
        .unwrap();
        let new = new.validate().unwrap();
        assert_eq!(new.name, "Ayu");
        assert_eq!(new.role, Role::Attendee);
        assert_eq!(new.initial_quota(Item::Indomie), 1);
        assert_eq!(new.initial_quota(Item::Beer), 3);
    }

    #[test]
    fn test_new_attendee_rejects_blank_name() {
        let new: NewAttendee = serde_json::from_value(serde_json::json!({
            "employee_id": "E1",
            "email": "a@example.com",
            "name": " ",
        }))
        .unwrap();
        assert!(new.validate().is_err());
    }

    #[test]
    fn test_patch_aliases() {
        let patch: AttendeePatch = serde_json::from_value(serde_json::json!({
            "indomie_quota": 0,
            "beer_quota": 5,
            "checkin": true,
        }))
        .unwrap();
        assert_eq!(patch.quota_indomie, Some(0));
        assert_eq!(patch.quota_beer, Some(5));
        assert_eq!(patch.checked_in, Some(true));
        assert!(!patch.is_empty());
    }

    #[test]
    fn test_patch_rejects_negative_quota() {
        let result = serde_json::from_value::<AttendeePatch>(serde_json::json!({
            "quota_beer": -1,
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_patch_unknown_fields_are_ignored() {
        let patch: AttendeePatch =
            serde_json::from_value(serde_json::json!({ "id": "x", "created_at": "y" })).unwrap();
        assert!(patch.is_empty());
    }

    #[test]
    fn test_patch_quota_bound() {
        let patch = AttendeePatch {
            quota_beer: Some(MAX_QUOTA + 1),
            ..AttendeePatch::default()
        };
        assert!(patch.validate().is_err());
    }
}
