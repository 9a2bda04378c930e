//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `EVENTPASS_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `EVENTPASS_SESSION_SECRET` - Session token signing secret (min 32 chars, high entropy)
//!
//! ## Optional
//! - `EVENTPASS_HOST` - Bind address (default: 127.0.0.1)
//! - `EVENTPASS_PORT` - Listen port (default: 3000)
//! - `EVENTPASS_BASE_URL` - Public URL (default: <http://localhost:3000>); `https://` enables secure cookies
//! - `EVENTPASS_SESSION_TTL_SECONDS` - Session lifetime (default: 86400)
//! - `EVENTPASS_TRUSTED_PROXY` - Take client IPs from proxy headers for rate limiting (default: false)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate, 0.0-1.0 (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate, 0.0-1.0 (default: 0.0)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

const MIN_SESSION_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const DEFAULT_SESSION_TTL_SECONDS: i64 = 24 * 60 * 60;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Server application configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL of the microsite
    pub base_url: String,
    /// Session token signing secret
    pub session_secret: SecretString,
    /// Session lifetime in seconds
    pub session_ttl_seconds: i64,
    /// Whether a reverse proxy overwrites client IP headers
    pub trust_proxy_headers: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. "production")
    pub sentry_environment: Option<String>,
    /// Fraction of errors sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced
    pub sentry_traces_sample_rate: f32,
}

impl ServerConfig {
    /// Load configuration from the process environment (and `.env`, if present).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing, a value does
    /// not parse, or the session secret is weak.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let database_url = var("EVENTPASS_DATABASE_URL")
            .or_else(|| var("DATABASE_URL"))
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar("EVENTPASS_DATABASE_URL".to_string()))?;

        let session_ttl_seconds: i64 = parse_env(
            "EVENTPASS_SESSION_TTL_SECONDS",
            &DEFAULT_SESSION_TTL_SECONDS.to_string(),
        )?;
        if session_ttl_seconds <= 0 {
            return Err(ConfigError::InvalidEnvVar(
                "EVENTPASS_SESSION_TTL_SECONDS".to_string(),
                "must be positive".to_string(),
            ));
        }

        Ok(Self {
            database_url,
            host: parse_env("EVENTPASS_HOST", "127.0.0.1")?,
            port: parse_env("EVENTPASS_PORT", "3000")?,
            base_url: var("EVENTPASS_BASE_URL")
                .unwrap_or_else(|| "http://localhost:3000".to_string()),
            session_secret: session_secret("EVENTPASS_SESSION_SECRET")?,
            session_ttl_seconds,
            trust_proxy_headers: parse_env("EVENTPASS_TRUSTED_PROXY", "false")?,
            sentry_dsn: var("SENTRY_DSN"),
            sentry_environment: var("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_env("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: parse_env("SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        })
    }

    /// Address the listener binds to.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn secure_cookies(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// A set, non-empty environment variable.
fn var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Parse an environment variable, or `default` when unset.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    var(key)
        .as_deref()
        .unwrap_or(default)
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    let mut counts: HashMap<char, u32> = HashMap::new();
    let mut total = 0_u32;
    for c in s.chars() {
        *counts.entry(c).or_default() += 1;
        total += 1;
    }
    if total == 0 {
        return 0.0;
    }

    let total = f64::from(total);
    counts
        .values()
        .map(|&n| {
            let p = f64::from(n) / total;
            -p * p.log2()
        })
        .sum()
}

/// Reject secrets that are short, look like a template value, or are
/// too repetitive to be random.
fn check_secret(secret: &str, key: &str) -> Result<(), ConfigError> {
    let insecure = |reason: String| ConfigError::InsecureSecret(key.to_string(), reason);

    let length = secret.chars().count();
    if length < MIN_SESSION_SECRET_LENGTH {
        return Err(insecure(format!(
            "must be at least {MIN_SESSION_SECRET_LENGTH} characters (got {length})"
        )));
    }

    let lower = secret.to_lowercase();
    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(insecure(format!(
            "appears to be a placeholder (contains '{pattern}')"
        )));
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(insecure(format!(
            "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1})"
        )));
    }

    Ok(())
}

/// Load the required session secret and check its strength.
fn session_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = var(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))?;
    check_secret(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_config(base_url: &str) -> ServerConfig {
        ServerConfig {
            database_url: SecretString::from("postgres://localhost/eventpass_test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: base_url.to_string(),
            session_secret: SecretString::from("Zq8#vL2@pX9!mR4$tK7&wN1*bH6^cJ3%"),
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            trust_proxy_headers: false,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }

    #[test]
    fn test_shannon_entropy() {
        assert!(shannon_entropy("").abs() < f64::EPSILON);
        assert!(shannon_entropy("zzzzzz").abs() < f64::EPSILON);
        assert!((shannon_entropy("ab") - 1.0).abs() < 0.01);
        assert!((shannon_entropy("abcd") - 2.0).abs() < 0.01);
    }

    #[test]
    fn test_check_secret() {
        assert!(check_secret("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6%", "K").is_ok());

        for weak in [
            "short",
            "changeme-session-key-for-the-event-2026",
            "abababababababababababababababab",
        ] {
            assert!(
                matches!(check_secret(weak, "K"), Err(ConfigError::InsecureSecret(ref k, _)) if k == "K"),
                "{weak}"
            );
        }
    }

    #[test]
    fn test_socket_addr() {
        let addr = test_config("http://localhost:3000").socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_secure_cookies_follow_scheme() {
        assert!(!test_config("http://localhost:3000").secure_cookies());
        assert!(test_config("https://event.example.org").secure_cookies());
    }

    #[test]
    fn test_debug_does_not_leak_secrets() {
        let debug_output = format!("{:?}", test_config("http://localhost:3000"));
        assert!(!debug_output.contains("Zq8#vL2@pX9"));
        assert!(!debug_output.contains("eventpass_test"));
    }
}
