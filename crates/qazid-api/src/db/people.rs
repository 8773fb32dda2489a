//! Person persistence operations.
//!
//! All functions take a `&PgPool` and operate on the `people` table.
//! IIN uniqueness is enforced both in the store (single write lock) and by
//! the table's UNIQUE constraint; the constraint is the backstop for rows
//! written by other processes or before a restart.

use chrono::{DateTime, Utc};
use qazid_core::{Iin, Phone};
use sqlx::PgPool;
use uuid::Uuid;

use crate::state::PersonRecord;

/// Insert a new person record.
///
/// A duplicate IIN surfaces as a database unique violation, which the API
/// error mapping turns into 409.
pub async fn insert(pool: &PgPool, record: &PersonRecord) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO people (id, name, iin, phone, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(record.id)
    .bind(&record.name)
    .bind(record.iin.as_str())
    .bind(record.phone.as_str())
    .bind(record.created_at)
    .bind(record.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Fetch a person by IIN.
pub async fn get_by_iin(pool: &PgPool, iin: &str) -> Result<Option<PersonRecord>, sqlx::Error> {
    let row = sqlx::query_as::<_, PersonRow>(
        "SELECT id, name, iin, phone, created_at, updated_at
         FROM people WHERE iin = $1",
    )
    .bind(iin)
    .fetch_optional(pool)
    .await?;

    Ok(row.and_then(PersonRow::into_record))
}

/// Case-insensitive name search with pagination.
///
/// Returns the requested page sorted by `(name, iin)` and the total number
/// of matching rows.
pub async fn search_by_name(
    pool: &PgPool,
    fragment: &str,
    limit: i64,
    offset: i64,
) -> Result<(Vec<PersonRecord>, i64), sqlx::Error> {
    let pattern = format!("%{fragment}%");

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM people WHERE name ILIKE $1")
        .bind(&pattern)
        .fetch_one(pool)
        .await?;

    let rows = sqlx::query_as::<_, PersonRow>(
        "SELECT id, name, iin, phone, created_at, updated_at
         FROM people WHERE name ILIKE $1 ORDER BY name ASC, iin ASC LIMIT $2 OFFSET $3",
    )
    .bind(&pattern)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok((
        rows.into_iter().filter_map(PersonRow::into_record).collect(),
        total,
    ))
}

/// Load all people from the database into the in-memory store on startup.
pub async fn load_all(pool: &PgPool) -> Result<Vec<PersonRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, PersonRow>(
        "SELECT id, name, iin, phone, created_at, updated_at
         FROM people ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().filter_map(PersonRow::into_record).collect())
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct PersonRow {
    id: Uuid,
    name: String,
    iin: String,
    phone: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PersonRow {
    /// Convert a database row into a domain record.
    ///
    /// This is the READ path: a row that fails newtype validation (e.g. a
    /// phone written by an earlier deployment with a looser format rule) is
    /// skipped with an ERROR log rather than poisoning startup hydration.
    /// The write path never produces such rows.
    fn into_record(self) -> Option<PersonRecord> {
        let iin = match Iin::new(self.iin.trim()) {
            Ok(iin) => iin,
            Err(e) => {
                tracing::error!(
                    id = %self.id,
                    error = %e,
                    "invalid IIN in database row — skipping; \
                     investigate: this may indicate data written by another process"
                );
                return None;
            }
        };

        let phone = match Phone::new(self.phone) {
            Ok(phone) => phone,
            Err(e) => {
                tracing::error!(
                    id = %self.id,
                    error = %e,
                    "invalid phone in database row — skipping; \
                     investigate: this may indicate data written by another process"
                );
                return None;
            }
        };

        Some(PersonRecord {
            id: self.id,
            name: self.name,
            iin,
            phone,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
