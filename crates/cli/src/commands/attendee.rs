//! Manual attendee management.
//!
//! # Usage
//!
//! ```bash
//! ep-cli attendee create -i E100 -e budi@example.com -n "Budi Santoso"
//! ep-cli attendee create -i S001 -e rina@example.com -n "Rina" -r staff --beer 0
//! ```

use eventpass_core::{AttendeeId, Email, EmployeeId, Role};
use eventpass_server::db::{AttendeeRepository, RepositoryError};
use eventpass_server::models::NewAttendee;

use super::{CliError, connect};

/// Arguments for `attendee create`.
#[derive(Debug, Clone)]
pub struct CreateArgs {
    pub employee_id: String,
    pub email: String,
    pub name: String,
    pub role: String,
    pub indomie: Option<u32>,
    pub beer: Option<u32>,
}

impl CreateArgs {
    /// Validate the arguments into a creation payload.
    fn into_new_attendee(self) -> Result<NewAttendee, CliError> {
        let employee_id =
            EmployeeId::parse(&self.employee_id).map_err(|e| CliError::InvalidArgument {
                field: "employee id",
                message: e.to_string(),
            })?;
        let email = Email::parse(&self.email).map_err(|e| CliError::InvalidArgument {
            field: "email",
            message: e.to_string(),
        })?;
        let role: Role = self
            .role
            .trim()
            .to_lowercase()
            .parse()
            .map_err(|_| CliError::InvalidArgument {
                field: "role",
                message: format!("{} (valid roles: attendee, staff, admin)", self.role),
            })?;

        NewAttendee {
            employee_id,
            email,
            name: self.name,
            role,
            quota_indomie: self.indomie,
            quota_beer: self.beer,
        }
        .validate()
        .map_err(|message| CliError::InvalidArgument {
            field: "attendee",
            message: message.to_owned(),
        })
    }
}

/// Create a single attendee.
pub async fn create(args: CreateArgs) -> Result<AttendeeId, CliError> {
    let new = args.into_new_attendee()?;

    let pool = connect().await?;
    tracing::info!("Creating attendee: {} ({})", new.employee_id, new.role);

    let attendee = AttendeeRepository::new(&pool)
        .create(&new)
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => CliError::InvalidArgument {
                field: "employee id",
                message: format!("{} already exists", new.employee_id),
            },
            other => other.into(),
        })?;

    tracing::info!(
        "Attendee created successfully! ID: {}, Employee ID: {}, Indomie: {}, Beer: {}",
        attendee.id,
        attendee.employee_id,
        attendee.quota_indomie,
        attendee.quota_beer
    );

    Ok(attendee.id)
}
