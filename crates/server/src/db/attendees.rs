//! Attendee repository for database operations.
//!
//! Queries are built at runtime with `sqlx::query_as` so the crate builds
//! without a live database.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use eventpass_core::{AttendeeId, Email, EmployeeId, Item, Role};

use super::{RepositoryError, quota_from_db, quota_to_db};
use crate::models::{Attendee, AttendeePatch, AttendeeSearch, NewAttendee, RosterEntry};

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` attendee queries.
#[derive(Debug, sqlx::FromRow)]
pub(super) struct AttendeeRow {
    id: Uuid,
    employee_id: String,
    email: String,
    name: String,
    role: Role,
    quota_indomie: i32,
    quota_beer: i32,
    checked_in: bool,
    last_redeem_ts: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AttendeeRow> for Attendee {
    type Error = RepositoryError;

    fn try_from(row: AttendeeRow) -> Result<Self, Self::Error> {
        let employee_id = EmployeeId::parse(&row.employee_id).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid employee_id in database: {e}"))
        })?;
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: AttendeeId::new(row.id),
            employee_id,
            email,
            name: row.name,
            role: row.role,
            quota_indomie: quota_from_db("quota_indomie", row.quota_indomie)?,
            quota_beer: quota_from_db("quota_beer", row.quota_beer)?,
            checked_in: row.checked_in,
            last_redeem_ts: row.last_redeem_ts,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct RosterUpsertRow {
    inserted: bool,
}

/// Whether a roster upsert created a new attendee or refreshed an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterUpsert {
    Inserted,
    Updated,
}

/// Escape `LIKE` wildcards in user input and wrap it for substring matching.
fn contains_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

fn map_unique_violation(e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict("employee_id already exists".to_owned());
    }
    RepositoryError::Database(e)
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for attendee database operations.
pub struct AttendeeRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AttendeeRepository<'a> {
    /// Create a new attendee repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Find the attendee matching a login attempt.
    ///
    /// The email is compared case-insensitively, the employee ID exactly.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the row is invalid.
    pub async fn find_for_login(
        &self,
        email: &Email,
        employee_id: &EmployeeId,
    ) -> Result<Option<Attendee>, RepositoryError> {
        let row = sqlx::query_as::<_, AttendeeRow>(
            r"
            SELECT id, employee_id, email, name, role,
                   quota_indomie, quota_beer, checked_in, last_redeem_ts,
                   created_at, updated_at
            FROM event.attendee
            WHERE lower(email) = $1 AND employee_id = $2
            LIMIT 1
            ",
        )
        .bind(email.as_str())
        .bind(employee_id.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get an attendee by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the row is invalid.
    pub async fn get_by_id(&self, id: AttendeeId) -> Result<Option<Attendee>, RepositoryError> {
        let row = sqlx::query_as::<_, AttendeeRow>(
            r"
            SELECT id, employee_id, email, name, role,
                   quota_indomie, quota_beer, checked_in, last_redeem_ts,
                   created_at, updated_at
            FROM event.attendee
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get an attendee by employee ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the row is invalid.
    pub async fn get_by_employee_id(
        &self,
        employee_id: &EmployeeId,
    ) -> Result<Option<Attendee>, RepositoryError> {
        let row = sqlx::query_as::<_, AttendeeRow>(
            r"
            SELECT id, employee_id, email, name, role,
                   quota_indomie, quota_beer, checked_in, last_redeem_ts,
                   created_at, updated_at
            FROM event.attendee
            WHERE employee_id = $1
            ",
        )
        .bind(employee_id.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// List one page of attendees, oldest first, with the total match count.
    ///
    /// The search term matches employee IDs as a substring and emails or
    /// names as a case-insensitive substring.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if a row is invalid.
    pub async fn list(
        &self,
        search: &AttendeeSearch,
    ) -> Result<(Vec<Attendee>, i64), RepositoryError> {
        let pattern = search.term.as_deref().map(contains_pattern);

        let total: i64 = sqlx::query_scalar(
            r"
            SELECT COUNT(*)
            FROM event.attendee
            WHERE $1::text IS NULL
               OR employee_id LIKE $1
               OR email ILIKE $1
               OR name ILIKE $1
            ",
        )
        .bind(pattern.as_deref())
        .fetch_one(self.pool)
        .await?;

        let rows = sqlx::query_as::<_, AttendeeRow>(
            r"
            SELECT id, employee_id, email, name, role,
                   quota_indomie, quota_beer, checked_in, last_redeem_ts,
                   created_at, updated_at
            FROM event.attendee
            WHERE $1::text IS NULL
               OR employee_id LIKE $1
               OR email ILIKE $1
               OR name ILIKE $1
            ORDER BY created_at ASC, id ASC
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(pattern.as_deref())
        .bind(i64::from(search.page_size))
        .bind(search.offset())
        .fetch_all(self.pool)
        .await?;

        let attendees = rows
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((attendees, total))
    }

    /// Create a new attendee. Unset quotas take the per-item defaults.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the employee ID already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, new: &NewAttendee) -> Result<Attendee, RepositoryError> {
        let row = sqlx::query_as::<_, AttendeeRow>(
            r"
            INSERT INTO event.attendee
                (employee_id, email, name, role, quota_indomie, quota_beer)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, employee_id, email, name, role,
                      quota_indomie, quota_beer, checked_in, last_redeem_ts,
                      created_at, updated_at
            ",
        )
        .bind(new.employee_id.as_str())
        .bind(new.email.as_str())
        .bind(&new.name)
        .bind(new.role)
        .bind(quota_to_db(new.initial_quota(Item::Indomie)))
        .bind(quota_to_db(new.initial_quota(Item::Beer)))
        .fetch_one(self.pool)
        .await
        .map_err(map_unique_violation)?;

        row.try_into()
    }

    /// Apply a partial update to an attendee.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no attendee has this ID.
    /// Returns `RepositoryError::Conflict` if the new employee ID is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: AttendeeId,
        patch: &AttendeePatch,
    ) -> Result<Attendee, RepositoryError> {
        let row = sqlx::query_as::<_, AttendeeRow>(
            r"
            UPDATE event.attendee
            SET employee_id   = COALESCE($2, employee_id),
                email         = COALESCE($3, email),
                name          = COALESCE($4, name),
                role          = COALESCE($5, role),
                quota_indomie = COALESCE($6, quota_indomie),
                quota_beer    = COALESCE($7, quota_beer),
                checked_in    = COALESCE($8, checked_in),
                updated_at    = NOW()
            WHERE id = $1
            RETURNING id, employee_id, email, name, role,
                      quota_indomie, quota_beer, checked_in, last_redeem_ts,
                      created_at, updated_at
            ",
        )
        .bind(id)
        .bind(patch.employee_id.as_ref().map(EmployeeId::as_str))
        .bind(patch.email.as_ref().map(Email::as_str))
        .bind(patch.name.as_deref())
        .bind(patch.role)
        .bind(patch.quota_indomie.map(quota_to_db))
        .bind(patch.quota_beer.map(quota_to_db))
        .bind(patch.checked_in)
        .fetch_optional(self.pool)
        .await
        .map_err(map_unique_violation)?;

        row.ok_or(RepositoryError::NotFound)?.try_into()
    }

    /// Delete an attendee.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no attendee has this ID.
    /// Returns `RepositoryError::Conflict` if the attendee has redemption history.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, id: AttendeeId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM event.attendee
            WHERE id = $1
            ",
        )
        .bind(id)
        .execute(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_foreign_key_violation()
            {
                return RepositoryError::Conflict(
                    "attendee has redemption history".to_owned(),
                );
            }
            RepositoryError::Database(e)
        })?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Mark an attendee as checked in. Repeated check-ins are harmless.
    ///
    /// Returns `None` if no attendee has this employee ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the row is invalid.
    pub async fn check_in(
        &self,
        employee_id: &EmployeeId,
    ) -> Result<Option<Attendee>, RepositoryError> {
        let row = sqlx::query_as::<_, AttendeeRow>(
            r"
            UPDATE event.attendee
            SET checked_in = TRUE, updated_at = NOW()
            WHERE employee_id = $1
            RETURNING id, employee_id, email, name, role,
                      quota_indomie, quota_beer, checked_in, last_redeem_ts,
                      created_at, updated_at
            ",
        )
        .bind(employee_id.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Insert a roster entry, or refresh email, name and role of the existing
    /// attendee with the same employee ID. Quotas are never modified.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert_roster(&self, entry: &RosterEntry) -> Result<RosterUpsert, RepositoryError> {
        let row = sqlx::query_as::<_, RosterUpsertRow>(
            r"
            INSERT INTO event.attendee (employee_id, email, name, role)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (employee_id) DO UPDATE
            SET email = EXCLUDED.email,
                name = EXCLUDED.name,
                role = EXCLUDED.role,
                updated_at = NOW()
            RETURNING (xmax = 0) AS inserted
            ",
        )
        .bind(entry.employee_id.as_str())
        .bind(entry.email.as_str())
        .bind(&entry.name)
        .bind(entry.role)
        .fetch_one(self.pool)
        .await?;

        Ok(if row.inserted {
            RosterUpsert::Inserted
        } else {
            RosterUpsert::Updated
        })
    }

    /// Total number of attendees.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM event.attendee")
            .fetch_one(self.pool)
            .await?;
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("rina"), "%rina%");
        assert_eq!(contains_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(contains_pattern("a\\b"), "%a\\\\b%");
    }
}
