//! Database operations for the event `PostgreSQL`.
//!
//! # Schema: `event`
//!
//! ## Tables
//!
//! - `attendee` - Roster with per-item quotas, role and check-in state
//! - `redemption_log` - Append-only audit trail, one row per successful redemption
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p eventpass-cli -- migrate
//! ```

pub mod attendees;
pub mod redemptions;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use attendees::AttendeeRepository;
pub use redemptions::RedemptionRepository;

/// Embedded schema migrations.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate employee ID).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Map a quota column read from the database to its unsigned domain value.
pub(crate) fn quota_from_db(column: &str, value: i32) -> Result<u32, RepositoryError> {
    u32::try_from(value).map_err(|_| {
        RepositoryError::DataCorruption(format!("negative {column} in database: {value}"))
    })
}

/// Convert an unsigned quota to the `INTEGER` column type, saturating at `i32::MAX`.
pub(crate) fn quota_to_db(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}
