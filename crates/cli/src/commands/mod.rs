//! CLI command implementations.

pub mod attendee;
pub mod count;
pub mod import;
pub mod migrate;

use eventpass_server::db::RepositoryError;
use sqlx::PgPool;
use thiserror::Error;

/// Errors that can occur while running a CLI command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failed.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Repository operation failed.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Roster file could not be read.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A command argument failed validation.
    #[error("Invalid {field}: {message}")]
    InvalidArgument {
        field: &'static str,
        message: String,
    },
}

/// Connect to the event database.
///
/// Reads `EVENTPASS_DATABASE_URL`, falling back to `DATABASE_URL`.
pub async fn connect() -> Result<PgPool, CliError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("EVENTPASS_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| CliError::MissingEnvVar("EVENTPASS_DATABASE_URL"))?;

    tracing::info!("Connecting to event database...");
    Ok(PgPool::connect(&database_url).await?)
}
