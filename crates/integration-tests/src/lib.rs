//! Integration tests for eventpass.
//!
//! These tests need a real `PostgreSQL` database and are ignored by default.
//!
//! # Running Tests
//!
//! ```bash
//! export EVENTPASS_TEST_DATABASE_URL=postgres://localhost/eventpass_test
//! cargo test -p eventpass-integration-tests -- --ignored
//! ```
//!
//! Migrations are applied on connect. Every test creates its own attendees
//! with unique employee IDs, so tests can share one database and run in
//! parallel.
//!
//! # Test Categories
//!
//! - `redemption` - quota decrement, audit rows, concurrent scans
//! - `http` - full router against the database (login, admin, export)

#![allow(
    clippy::missing_panics_doc,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing
)]

use chrono::Utc;
use secrecy::SecretString;
use sqlx::PgPool;
use uuid::Uuid;

use eventpass_core::{Email, EmployeeId, Role};
use eventpass_server::AppState;
use eventpass_server::config::ServerConfig;
use eventpass_server::db::{AttendeeRepository, MIGRATOR};
use eventpass_server::models::{Attendee, NewAttendee, SessionClaims};

/// Environment variable holding the test database URL.
pub const TEST_DATABASE_URL: &str = "EVENTPASS_TEST_DATABASE_URL";

/// Connect to the test database and apply migrations.
pub async fn test_pool() -> PgPool {
    dotenvy::dotenv().ok();
    let url = std::env::var(TEST_DATABASE_URL)
        .unwrap_or_else(|_| panic!("{TEST_DATABASE_URL} must be set for integration tests"));

    let pool = PgPool::connect(&url).await.expect("connect to test database");
    MIGRATOR.run(&pool).await.expect("apply migrations");
    pool
}

/// Employee ID unique to this test run.
pub fn unique_employee_id(prefix: &str) -> EmployeeId {
    let suffix = Uuid::new_v4().simple().to_string();
    EmployeeId::parse(&format!("{prefix}-{}", &suffix[..12])).unwrap()
}

/// Insert an attendee with the given role and quotas.
pub async fn seed_attendee(pool: &PgPool, role: Role, indomie: u32, beer: u32) -> Attendee {
    let employee_id = unique_employee_id("T");
    let email = Email::parse(&format!(
        "{}@example.com",
        employee_id.as_str().to_lowercase()
    ))
    .unwrap();

    AttendeeRepository::new(pool)
        .create(&NewAttendee {
            employee_id,
            email,
            name: "Test Attendee".to_string(),
            role,
            quota_indomie: Some(indomie),
            quota_beer: Some(beer),
        })
        .await
        .expect("seed attendee")
}

/// Server configuration pointing at the test database.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        database_url: SecretString::from(std::env::var(TEST_DATABASE_URL).unwrap_or_default()),
        host: "127.0.0.1".parse().unwrap(),
        port: 3000,
        base_url: "http://localhost:3000".to_string(),
        session_secret: SecretString::from("Zq8#vL2@pX9!mR4$tK7&wN1*bH6^cJ3%"),
        session_ttl_seconds: 3600,
        trust_proxy_headers: false,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

/// Application state over the given pool.
pub fn test_state(pool: PgPool) -> AppState {
    AppState::new(test_config(), pool)
}

/// `Cookie` header value carrying a session for `attendee`.
pub fn session_cookie(state: &AppState, attendee: &Attendee) -> String {
    let token = state.sessions().issue(attendee).unwrap();
    format!("session={token}")
}

/// `Cookie` header value carrying an arbitrary session (e.g. for a deleted attendee).
pub fn claims_cookie(state: &AppState, claims: &SessionClaims) -> String {
    let token = state.sessions().sign(claims).unwrap();
    format!("session={token}")
}

/// Current Unix time, for building claims by hand.
pub fn now() -> i64 {
    Utc::now().timestamp()
}
