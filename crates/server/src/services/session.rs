//! Signed session tokens.
//!
//! Sessions are stateless: an HS256 JWT holding [`SessionClaims`] is stored in
//! an HttpOnly cookie and verified on every request. Nothing is persisted.

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use crate::models::{Attendee, SessionClaims};

/// Clock skew tolerated when checking expiry, in seconds.
const LEEWAY_SECONDS: u64 = 5;

/// Errors that can occur while issuing or verifying a session token.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Token signature, structure or claims are invalid.
    #[error("invalid session token")]
    Invalid(#[source] jsonwebtoken::errors::Error),

    /// Token has expired.
    #[error("session expired")]
    Expired,

    /// Token could not be signed.
    #[error("failed to sign session token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

/// Keys and lifetime used to issue and verify session tokens.
#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_seconds: i64,
}

impl std::fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionKeys")
            .field("keys", &"[REDACTED]")
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}

impl SessionKeys {
    /// Derive signing keys from the configured secret.
    #[must_use]
    pub fn new(secret: &SecretString, ttl_seconds: i64) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
            ttl_seconds,
        }
    }

    /// Session lifetime in seconds.
    #[must_use]
    pub const fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    /// Build the claims for a freshly authenticated attendee.
    #[must_use]
    pub fn claims_for(&self, attendee: &Attendee) -> SessionClaims {
        let now = Utc::now().timestamp();
        SessionClaims {
            sub: attendee.id,
            employee_id: attendee.employee_id.to_string(),
            email: attendee.email.to_string(),
            role: attendee.role,
            name: Some(attendee.name.clone()),
            iat: now,
            exp: now + self.ttl_seconds,
        }
    }

    /// Sign a token for the given attendee.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Signing` if encoding fails.
    pub fn issue(&self, attendee: &Attendee) -> Result<String, SessionError> {
        self.sign(&self.claims_for(attendee))
    }

    /// Sign arbitrary claims.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Signing` if encoding fails.
    pub fn sign(&self, claims: &SessionClaims) -> Result<String, SessionError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(SessionError::Signing)
    }

    /// Verify a token's signature and expiry and return its claims.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Expired` for expired tokens and
    /// `SessionError::Invalid` for anything else that fails validation.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, SessionError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = LEEWAY_SECONDS;

        jsonwebtoken::decode::<SessionClaims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => SessionError::Expired,
                _ => SessionError::Invalid(e),
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use eventpass_core::{AttendeeId, Email, EmployeeId, Role};

    use super::*;

    const SECRET: &str = "Zq8#vL2@pX9!mR4$tK7&wN1*bH6^cJ3%";

    fn attendee(role: Role) -> Attendee {
        Attendee {
            id: AttendeeId::generate(),
            employee_id: EmployeeId::parse("E100").unwrap(),
            email: Email::parse("budi@example.com").unwrap(),
            name: "Budi".to_string(),
            role,
            quota_indomie: 1,
            quota_beer: 3,
            checked_in: false,
            last_redeem_ts: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn keys(ttl: i64) -> SessionKeys {
        SessionKeys::new(&SecretString::from(SECRET), ttl)
    }

    #[test]
    fn test_issue_then_verify() {
        let keys = keys(3600);
        let attendee = attendee(Role::Staff);
        let token = keys.issue(&attendee).unwrap();

        let claims = keys.verify(&token).unwrap();
        assert_eq!(claims.sub, attendee.id);
        assert_eq!(claims.role, Role::Staff);
        assert_eq!(claims.employee_id, "E100");
        assert_eq!(claims.email, "budi@example.com");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_expired_token_rejected() {
        let keys = keys(-60);
        let token = keys.issue(&attendee(Role::Attendee)).unwrap();
        assert!(matches!(keys.verify(&token), Err(SessionError::Expired)));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = keys(3600).issue(&attendee(Role::Admin)).unwrap();
        let other = SessionKeys::new(&SecretString::from("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6"), 3600);
        assert!(matches!(other.verify(&token), Err(SessionError::Invalid(_))));
    }

    #[test]
    fn test_tampered_token_rejected() {
        let keys = keys(3600);
        let token = keys.issue(&attendee(Role::Attendee)).unwrap();

        // Swap the payload for one claiming admin, keeping the original signature.
        let forged = keys.claims_for(&attendee(Role::Admin));
        let forged_token = keys.sign(&forged).unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        let forged_parts: Vec<&str> = forged_token.split('.').collect();
        parts[1] = forged_parts[1];
        let tampered = parts.join(".");

        assert!(matches!(keys.verify(&tampered), Err(SessionError::Invalid(_))));
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(matches!(
            keys(3600).verify("not-a-token"),
            Err(SessionError::Invalid(_))
        ));
    }

    #[test]
    fn test_debug_redacts_keys() {
        let output = format!("{:?}", keys(3600));
        assert!(output.contains("REDACTED"));
        assert!(!output.contains(SECRET));
    }
}
