//! eventpass CLI - database migrations and roster management.
//!
//! # Usage
//!
//! ```bash
//! # Apply database migrations
//! ep-cli migrate
//!
//! # Import (or refresh) the attendee roster from a CSV export
//! ep-cli import attendees.csv
//!
//! # Create a single attendee
//! ep-cli attendee create -i E100 -e budi@example.com -n "Budi Santoso" --beer 2
//!
//! # Print the attendee head count
//! ep-cli count
//! ```
//!
//! # Environment Variables
//!
//! - `EVENTPASS_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

use commands::{CliError, attendee::CreateArgs};

#[derive(Parser)]
#[command(name = "ep-cli")]
#[command(author, version, about = "eventpass CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply database migrations
    Migrate,
    /// Import the attendee roster from a CSV file
    Import {
        /// Path to the roster CSV
        file: PathBuf,
    },
    /// Manage attendees
    Attendee {
        #[command(subcommand)]
        action: AttendeeAction,
    },
    /// Print the number of attendees
    Count,
}

#[derive(Subcommand)]
enum AttendeeAction {
    /// Create a new attendee
    Create {
        /// Employee ID (login credential and QR payload)
        #[arg(short = 'i', long)]
        employee_id: String,

        /// Email address
        #[arg(short, long)]
        email: String,

        /// Display name
        #[arg(short, long)]
        name: String,

        /// Role (`attendee`, `staff`, `admin`)
        #[arg(short, long, default_value = "attendee")]
        role: String,

        /// Indomie quota (defaults to 1)
        #[arg(long)]
        indomie: Option<u32>,

        /// Beer quota (defaults to 3)
        #[arg(long)]
        beer: Option<u32>,
    },
}

#[tokio::main]
async fn main() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "ep_cli=info,eventpass_server=info".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Import { file } => {
            commands::import::run(&file).await?;
        }
        Commands::Attendee { action } => match action {
            AttendeeAction::Create {
                employee_id,
                email,
                name,
                role,
                indomie,
                beer,
            } => {
                commands::attendee::create(CreateArgs {
                    employee_id,
                    email,
                    name,
                    role,
                    indomie,
                    beer,
                })
                .await?;
            }
        },
        Commands::Count => commands::count::run().await?,
    }
    Ok(())
}
