//! Redemption transaction and audit log queries.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use eventpass_core::{EmployeeId, Item, REDEMPTION_DELTA, RedemptionLogId};

use super::{RepositoryError, quota_from_db};
use crate::models::{LogFilter, QuotaSnapshot, RedemptionLogEntry, RedemptionRequest};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct QuotaRow {
    id: Uuid,
    employee_id: String,
    quota_indomie: i32,
    quota_beer: i32,
    last_redeem_ts: Option<DateTime<Utc>>,
}

impl TryFrom<QuotaRow> for QuotaSnapshot {
    type Error = RepositoryError;

    fn try_from(row: QuotaRow) -> Result<Self, Self::Error> {
        let employee_id = EmployeeId::parse(&row.employee_id).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid employee_id in database: {e}"))
        })?;

        Ok(Self {
            employee_id,
            quota_indomie: quota_from_db("quota_indomie", row.quota_indomie)?,
            quota_beer: quota_from_db("quota_beer", row.quota_beer)?,
            last_redeem_ts: row.last_redeem_ts,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct LogRow {
    id: i64,
    ts: DateTime<Utc>,
    item: Item,
    delta: i32,
    booth_id: String,
    scanned_by: String,
    employee_id: String,
    name: String,
    email: String,
}

impl From<LogRow> for RedemptionLogEntry {
    fn from(row: LogRow) -> Self {
        Self {
            id: RedemptionLogId::new(row.id),
            ts: row.ts,
            employee_id: row.employee_id,
            item: row.item,
            delta: row.delta,
            booth_id: row.booth_id,
            scanned_by: row.scanned_by,
            name: row.name,
            email: row.email,
        }
    }
}

/// Conditional decrement for one quota column.
///
/// The `> 0` guard lives in the `WHERE` clause so concurrent redemptions
/// serialize on the row lock and the loser matches zero rows.
const fn decrement_sql(item: Item) -> &'static str {
    match item {
        Item::Indomie => {
            r"
            UPDATE event.attendee
            SET quota_indomie = quota_indomie - 1,
                last_redeem_ts = NOW(),
                updated_at = NOW()
            WHERE employee_id = $1 AND quota_indomie > 0
            "
        }
        Item::Beer => {
            r"
            UPDATE event.attendee
            SET quota_beer = quota_beer - 1,
                last_redeem_ts = NOW(),
                updated_at = NOW()
            WHERE employee_id = $1 AND quota_beer > 0
            "
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for redemptions and the audit log.
pub struct RedemptionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RedemptionRepository<'a> {
    /// Create a new redemption repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Redeem one unit of an item for an attendee.
    ///
    /// Decrements the quota only if it is positive, then appends an audit row,
    /// all in one transaction. Returns `None` when the attendee does not exist
    /// or the quota is already exhausted; in that case nothing is written.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails; the
    /// transaction is rolled back.
    pub async fn redeem(
        &self,
        request: &RedemptionRequest,
    ) -> Result<Option<QuotaSnapshot>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(decrement_sql(request.item))
            .bind(request.employee_id.as_str())
            .execute(&mut *tx)
            .await?;

        if updated.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        let row = sqlx::query_as::<_, QuotaRow>(
            r"
            SELECT id, employee_id, quota_indomie, quota_beer, last_redeem_ts
            FROM event.attendee
            WHERE employee_id = $1
            ",
        )
        .bind(request.employee_id.as_str())
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r"
            INSERT INTO event.redemption_log
                (attendee_id, item, delta, booth_id, scanned_by)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(row.id)
        .bind(request.item)
        .bind(REDEMPTION_DELTA)
        .bind(request.booth_id.as_str())
        .bind(&request.scanned_by)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        row.try_into().map(Some)
    }

    /// List audit rows, newest first, joined with their attendee.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, filter: &LogFilter) -> Result<Vec<RedemptionLogEntry>, RepositoryError> {
        let rows = sqlx::query_as::<_, LogRow>(
            r"
            SELECT l.id, l.ts, l.item, l.delta, l.booth_id, l.scanned_by,
                   a.employee_id, a.name, a.email
            FROM event.redemption_log l
            JOIN event.attendee a ON a.id = l.attendee_id
            WHERE ($1::event.redeem_item IS NULL OR l.item = $1)
              AND ($2::timestamptz IS NULL OR l.ts >= $2)
              AND ($3::timestamptz IS NULL OR l.ts <= $3)
            ORDER BY l.ts DESC, l.id DESC
            ",
        )
        .bind(filter.item)
        .bind(filter.from)
        .bind(filter.to)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decrement_sql_targets_item_column() {
        let sql = decrement_sql(Item::Beer);
        assert!(sql.contains("quota_beer = quota_beer - 1"));
        assert!(sql.contains("quota_beer > 0"));
        assert!(!sql.contains("quota_indomie"));

        let sql = decrement_sql(Item::Indomie);
        assert!(sql.contains("quota_indomie > 0"));
        assert!(!sql.contains("quota_beer"));
    }
}
