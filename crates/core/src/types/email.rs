//! Attendee email address.

use core::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Why a string was rejected as an [`Email`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    #[error("email cannot be empty")]
    Empty,
    #[error("email must be at most {} characters", Email::MAX_LENGTH)]
    TooLong,
    #[error("email must contain exactly one @")]
    BadAtSign,
    #[error("email needs text on both sides of the @")]
    MissingPart,
}

/// An email address in canonical form: trimmed and lowercased.
///
/// Login matches emails without regard to case, so normalizing once at the
/// boundary lets the rest of the code compare with `==`.
///
/// ```
/// use eventpass_core::Email;
///
/// let email = Email::parse("  Budi.Santoso@Example.COM ").unwrap();
/// assert_eq!(email.as_str(), "budi.santoso@example.com");
/// assert!(Email::parse("budi@").is_err());
/// ```
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// RFC 5321 path limit.
    pub const MAX_LENGTH: usize = 254;

    /// Validate and canonicalize an address.
    ///
    /// # Errors
    ///
    /// Returns an [`EmailError`] describing the first problem found.
    pub fn parse(raw: &str) -> Result<Self, EmailError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(EmailError::Empty);
        }
        if trimmed.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong);
        }

        let (local, domain) = trimmed.split_once('@').ok_or(EmailError::BadAtSign)?;
        if domain.contains('@') {
            return Err(EmailError::BadAtSign);
        }
        if local.is_empty() || domain.is_empty() {
            return Err(EmailError::MissingPart);
        }

        Ok(Self(trimmed.to_lowercase()))
    }

    /// The canonical address.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the canonical address.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<'de> Deserialize<'de> for Email {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_common_shapes() {
        for ok in ["user@example.com", "first.last+event@corp.co.id", "a@b"] {
            assert!(Email::parse(ok).is_ok(), "{ok}");
        }
    }

    #[test]
    fn test_case_and_whitespace_are_not_identity() {
        let a = Email::parse("Rina@Company.co.id").unwrap();
        let b = Email::parse("  rina@company.CO.ID\t").unwrap();
        assert_eq!(a, b);
        assert_eq!(b.into_inner(), "rina@company.co.id");
    }

    #[test]
    fn test_rejections() {
        assert_eq!(Email::parse("  "), Err(EmailError::Empty));
        assert_eq!(Email::parse("budi.example.com"), Err(EmailError::BadAtSign));
        assert_eq!(Email::parse("a@b@c"), Err(EmailError::BadAtSign));
        assert_eq!(Email::parse("@corp.com"), Err(EmailError::MissingPart));
        assert_eq!(Email::parse("budi@"), Err(EmailError::MissingPart));

        let long = format!("{}@example.com", "x".repeat(Email::MAX_LENGTH));
        assert_eq!(Email::parse(&long), Err(EmailError::TooLong));
    }

    #[test]
    fn test_deserialize_canonicalizes() {
        let parsed: Email = serde_json::from_str("\"Ops@Example.com\"").unwrap();
        assert_eq!(parsed.as_str(), "ops@example.com");
        assert!(serde_json::from_str::<Email>("\"not-an-email\"").is_err());
    }
}
