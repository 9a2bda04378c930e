//! Session-related types.
//!
//! Claims carried in the signed session cookie.

use serde::{Deserialize, Serialize};

use eventpass_core::{AttendeeId, Role};

/// Name of the cookie holding the session token.
pub const SESSION_COOKIE: &str = "session";

/// Identity of the logged-in attendee, as signed into the session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Attendee database ID.
    pub sub: AttendeeId,
    /// Employee ID, encoded in the attendee's QR code.
    pub employee_id: String,
    /// Email address at login time.
    pub email: String,
    /// Role at login time.
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Issued-at, seconds since the Unix epoch.
    pub iat: i64,
    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,
}

impl SessionClaims {
    /// Identity recorded as `scanned_by` on audit rows.
    #[must_use]
    pub fn scanned_by(&self) -> &str {
        if self.email.is_empty() {
            &self.employee_id
        } else {
            &self.email
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(email: &str) -> SessionClaims {
        SessionClaims {
            sub: AttendeeId::generate(),
            employee_id: "S01".to_string(),
            email: email.to_string(),
            role: Role::Staff,
            name: None,
            iat: 0,
            exp: 0,
        }
    }

    #[test]
    fn test_scanned_by_prefers_email() {
        assert_eq!(claims("staff@example.com").scanned_by(), "staff@example.com");
    }

    #[test]
    fn test_scanned_by_falls_back_to_employee_id() {
        assert_eq!(claims("").scanned_by(), "S01");
    }
}
