//! Roster import from CSV.
//!
//! # Usage
//!
//! ```bash
//! ep-cli import attendees.csv
//! ```
//!
//! Headers are matched case-insensitively after trimming, with spaces read as
//! underscores. A leading UTF-8 BOM (as written by spreadsheet exports) is
//! ignored. Recognized columns:
//!
//! | Field       | Accepted headers                                                   |
//! |-------------|--------------------------------------------------------------------|
//! | employee id | `employee_id`, `employeeid`, `employee_no`, `employee_number`, `id` |
//! | email       | `email`, `email_address`                                           |
//! | name        | `name`, `full_name`, `fullname`                                    |
//! | role        | `role`, `roles` (anything unrecognized imports as attendee)        |
//!
//! Existing attendees (matched by employee ID) get their email, name and role
//! updated. Quotas are never touched.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use eventpass_core::{Email, EmployeeId, Role};
use eventpass_server::db::{AttendeeRepository, attendees::RosterUpsert};
use eventpass_server::models::{RosterEntry, attendee::clean_name};

use super::{CliError, connect};

const EMPLOYEE_ID_HEADERS: &[&str] = &[
    "employee_id",
    "employeeid",
    "employee_no",
    "employee_number",
    "id",
];
const EMAIL_HEADERS: &[&str] = &["email", "email_address"];
const NAME_HEADERS: &[&str] = &["name", "full_name", "fullname"];
const ROLE_HEADERS: &[&str] = &["role", "roles"];

/// Why a roster row was not imported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SkipReason {
    MissingEmployeeId,
    MissingEmail,
    MissingName,
    InvalidEmployeeId,
    InvalidEmail,
    InvalidName,
    Database,
}

impl SkipReason {
    /// Stable key used in the import summary.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MissingEmployeeId => "missing_employee_id",
            Self::MissingEmail => "missing_email",
            Self::MissingName => "missing_name",
            Self::InvalidEmployeeId => "invalid_employee_id",
            Self::InvalidEmail => "invalid_email",
            Self::InvalidName => "invalid_name",
            Self::Database => "database_error",
        }
    }
}

/// Rows read from a roster file, before touching the database.
#[derive(Debug, Default)]
pub struct ParsedRoster {
    pub processed: usize,
    pub entries: Vec<RosterEntry>,
    pub skipped: Vec<SkipReason>,
}

/// Outcome of an import run.
#[derive(Debug, Default)]
pub struct ImportSummary {
    pub processed: usize,
    pub inserted: usize,
    pub updated: usize,
    pub skipped: BTreeMap<SkipReason, usize>,
}

impl ImportSummary {
    /// Total number of skipped rows.
    #[must_use]
    pub fn skipped_total(&self) -> usize {
        self.skipped.values().sum()
    }

    fn skip(&mut self, reason: SkipReason) {
        *self.skipped.entry(reason).or_default() += 1;
    }

    fn reasons(&self) -> String {
        self.skipped
            .iter()
            .map(|(reason, n)| format!("{}={n}", reason.as_str()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Normalize a header: strip a BOM, trim, lowercase, spaces to underscores.
fn normalize_header(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}')
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

/// Column positions for each recognized field, in alias priority order.
struct Columns {
    employee_id: Vec<usize>,
    email: Vec<usize>,
    name: Vec<usize>,
    role: Vec<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Self {
        let normalized: Vec<String> = headers.iter().map(normalize_header).collect();
        let positions = |aliases: &[&str]| -> Vec<usize> {
            aliases
                .iter()
                .filter_map(|alias| normalized.iter().position(|h| h == alias))
                .collect()
        };

        Self {
            employee_id: positions(EMPLOYEE_ID_HEADERS),
            email: positions(EMAIL_HEADERS),
            name: positions(NAME_HEADERS),
            role: positions(ROLE_HEADERS),
        }
    }
}

/// First non-empty value among the given columns.
fn first_value<'r>(record: &'r StringRecord, columns: &[usize]) -> Option<&'r str> {
    columns
        .iter()
        .filter_map(|&i| record.get(i))
        .map(str::trim)
        .find(|v| !v.is_empty())
}

fn parse_row(record: &StringRecord, columns: &Columns) -> Result<RosterEntry, SkipReason> {
    let employee_id =
        first_value(record, &columns.employee_id).ok_or(SkipReason::MissingEmployeeId)?;
    let email = first_value(record, &columns.email).ok_or(SkipReason::MissingEmail)?;
    let name = first_value(record, &columns.name).ok_or(SkipReason::MissingName)?;
    let role = first_value(record, &columns.role).map_or(Role::Attendee, Role::from_roster);

    Ok(RosterEntry {
        employee_id: EmployeeId::parse(employee_id)
            .map_err(|_| SkipReason::InvalidEmployeeId)?,
        email: Email::parse(email).map_err(|_| SkipReason::InvalidEmail)?,
        name: clean_name(name).map_err(|_| SkipReason::InvalidName)?,
        role,
    })
}

/// Parse a roster CSV into validated entries and skip reasons.
///
/// # Errors
///
/// Returns an error if the CSV itself is malformed.
pub fn parse_roster<R: Read>(reader: R) -> Result<ParsedRoster, csv::Error> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let columns = Columns::from_headers(reader.headers()?);
    let mut parsed = ParsedRoster::default();

    for record in reader.records() {
        let record = record?;
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }

        parsed.processed += 1;
        match parse_row(&record, &columns) {
            Ok(entry) => parsed.entries.push(entry),
            Err(reason) => parsed.skipped.push(reason),
        }
    }

    Ok(parsed)
}

/// Import a roster file into the database.
pub async fn run(path: &Path) -> Result<ImportSummary, CliError> {
    let file = std::fs::File::open(path).map_err(|e| CliError::InvalidArgument {
        field: "roster file",
        message: format!("{}: {e}", path.display()),
    })?;
    let parsed = parse_roster(file)?;

    let pool = connect().await?;
    let repo = AttendeeRepository::new(&pool);

    let mut summary = ImportSummary {
        processed: parsed.processed,
        ..ImportSummary::default()
    };
    for reason in parsed.skipped {
        summary.skip(reason);
    }

    for entry in &parsed.entries {
        match repo.upsert_roster(entry).await {
            Ok(RosterUpsert::Inserted) => summary.inserted += 1,
            Ok(RosterUpsert::Updated) => summary.updated += 1,
            Err(e) => {
                tracing::warn!(employee_id = %entry.employee_id, error = %e, "Roster row failed");
                summary.skip(SkipReason::Database);
            }
        }
    }

    tracing::info!(
        "Processed {}, Imported {}, Updated {}, Skipped {}",
        summary.processed,
        summary.inserted,
        summary.updated,
        summary.skipped_total()
    );
    if !summary.skipped.is_empty() {
        tracing::info!("Skip reasons: {}", summary.reasons());
    }

    Ok(summary)
}
