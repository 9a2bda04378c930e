//! Attendee head count.

use eventpass_server::db::AttendeeRepository;

use super::{CliError, connect};

/// Print the number of attendees on the roster.
pub async fn run() -> Result<(), CliError> {
    let pool = connect().await?;
    let total = AttendeeRepository::new(&pool).count().await?;

    #[allow(clippy::print_stdout)]
    {
        println!("{total}");
    }

    Ok(())
}
