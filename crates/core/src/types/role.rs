//! Attendee roles.

use serde::{Deserialize, Serialize};

/// Role of an attendee record, which doubles as its authorization level.
///
/// The set is closed: route guards `match` on it exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "event.attendee_role", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Regular guest; can only see their own record and QR code.
    #[default]
    Attendee,
    /// Booth staff; can scan QR codes, redeem and check in.
    Staff,
    /// Everything staff can do, plus attendee management and log export.
    Admin,
}

/// Error returned when a role string is not one of the known roles.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid role: {0}")]
pub struct ParseRoleError(pub String);

impl Role {
    /// Whether this role may redeem quotas and check attendees in.
    #[must_use]
    pub const fn can_scan(self) -> bool {
        match self {
            Self::Staff | Self::Admin => true,
            Self::Attendee => false,
        }
    }

    /// Whether this role may manage attendees and export logs.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Page a freshly logged-in user is sent to.
    #[must_use]
    pub const fn landing_path(self) -> &'static str {
        match self {
            Self::Admin => "/admin",
            Self::Staff => "/staff",
            Self::Attendee => "/my",
        }
    }

    /// Lenient parse used for roster imports: anything unrecognized is an attendee.
    #[must_use]
    pub fn from_roster(value: &str) -> Self {
        value.trim().to_lowercase().parse().unwrap_or_default()
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Attendee => write!(f, "attendee"),
            Self::Staff => write!(f, "staff"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "attendee" => Ok(Self::Attendee),
            "staff" => Ok(Self::Staff),
            "admin" => Ok(Self::Admin),
            _ => Err(ParseRoleError(s.to_owned())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_permissions() {
        assert!(!Role::Attendee.can_scan());
        assert!(Role::Staff.can_scan());
        assert!(Role::Admin.can_scan());
    }

    #[test]
    fn test_admin_permissions() {
        assert!(!Role::Attendee.is_admin());
        assert!(!Role::Staff.is_admin());
        assert!(Role::Admin.is_admin());
    }

    #[test]
    fn test_landing_paths() {
        assert_eq!(Role::Admin.landing_path(), "/admin");
        assert_eq!(Role::Staff.landing_path(), "/staff");
        assert_eq!(Role::Attendee.landing_path(), "/my");
    }

    #[test]
    fn test_display_from_str_agree() {
        for role in [Role::Attendee, Role::Staff, Role::Admin] {
            assert_eq!(role.to_string().parse::<Role>().unwrap(), role);
        }
        assert!("Admin".parse::<Role>().is_err());
        assert!("superuser".parse::<Role>().is_err());
    }

    #[test]
    fn test_from_roster_is_lenient() {
        assert_eq!(Role::from_roster(" ADMIN "), Role::Admin);
        assert_eq!(Role::from_roster("Staff"), Role::Staff);
        assert_eq!(Role::from_roster("volunteer"), Role::Attendee);
        assert_eq!(Role::from_roster(""), Role::Attendee);
    }

    #[test]
    fn test_serde_snake_case() {
        assert_eq!(serde_json::to_string(&Role::Staff).unwrap(), "\"staff\"");
        let role: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(role, Role::Admin);
    }
}
