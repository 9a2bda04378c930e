//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! ep-cli migrate
//! ```
//!
//! Migrations are embedded from `crates/server/migrations/`.

use eventpass_server::db::MIGRATOR;

use super::{CliError, connect};

/// Apply all pending migrations.
pub async fn run() -> Result<(), CliError> {
    let pool = connect().await?;

    tracing::info!("Running event migrations...");
    MIGRATOR.run(&pool).await?;

    tracing::info!("Event migrations complete!");
    Ok(())
}
