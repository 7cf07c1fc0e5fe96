use anyhow::Result;
use sqlx::{Sqlite, SqlitePool, QueryBuilder};
use time::PrimitiveDateTime;

use crate::domain::{Reading, ReadingCandidate};

pub async fn all_readings(pool: &SqlitePool) -> Result<Vec<Reading>> {
    let rows = sqlx::query_as::<_, Reading>(
        r#"
        SELECT reading_id, account_id, reading_datetime, meter_read_value
        FROM readings
        ORDER BY reading_id
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

pub async fn find_reading(pool: &SqlitePool, id: i64) -> Result<Option<Reading>> {
    let row = sqlx::query_as::<_, Reading>(
        r#"
        SELECT reading_id, account_id, reading_datetime, meter_read_value
        FROM readings
        WHERE reading_id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Time-ordered readings for one account.
pub async fn readings_for_account(pool: &SqlitePool, account_id: i64) -> Result<Vec<Reading>> {
    let rows = sqlx::query_as::<_, Reading>(
        r#"
        SELECT reading_id, account_id, reading_datetime, meter_read_value
        FROM readings
        WHERE account_id = ?
        ORDER BY reading_datetime
        "#,
    )
    .bind(account_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// The greatest reading timestamp currently persisted for an account, if
/// the account has any readings at all.
pub async fn latest_reading_datetime(
    pool: &SqlitePool,
    account_id: i64,
) -> Result<Option<PrimitiveDateTime>> {
    let latest = sqlx::query_scalar::<_, PrimitiveDateTime>(
        r#"
        SELECT reading_datetime
        FROM readings
        WHERE account_id = ?
        ORDER BY reading_datetime DESC
        LIMIT 1
        "#,
    )
    .bind(account_id)
    .fetch_optional(pool)
    .await?;

    Ok(latest)
}

/// Whether a reading with this exact `(datetime, value)` pair already
/// exists for the account.
pub async fn reading_exists(
    pool: &SqlitePool,
    account_id: i64,
    reading_datetime: PrimitiveDateTime,
    meter_read_value: &str,
) -> Result<bool> {
    let exists: i64 = sqlx::query_scalar(
        r#"
        SELECT EXISTS (
            SELECT 1
            FROM readings
            WHERE account_id = ?
              AND reading_datetime = ?
              AND meter_read_value = ?
        )
        "#,
    )
    .bind(account_id)
    .bind(reading_datetime)
    .bind(meter_read_value)
    .fetch_one(pool)
    .await?;

    Ok(exists != 0)
}

/// Insert an accepted reading and return its generated id.
pub async fn insert_reading(pool: &SqlitePool, candidate: &ReadingCandidate) -> Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO readings (account_id, reading_datetime, meter_read_value)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(candidate.account_id)
    .bind(candidate.reading_datetime)
    .bind(&candidate.meter_read_value)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Write only the fields given as `Some`. The owning account is immutable
/// and is deliberately not a parameter here. Returns the number of rows
/// written.
pub async fn update_reading(
    pool: &SqlitePool,
    id: i64,
    reading_datetime: Option<PrimitiveDateTime>,
    meter_read_value: Option<&str>,
) -> Result<u64> {
    if reading_datetime.is_none() && meter_read_value.is_none() {
        return Ok(0);
    }

    let mut builder = QueryBuilder::<Sqlite>::new("UPDATE readings SET ");
    let mut fields = builder.separated(", ");
    if let Some(value) = reading_datetime {
        fields.push("reading_datetime = ");
        fields.push_bind_unseparated(value);
    }
    if let Some(value) = meter_read_value {
        fields.push("meter_read_value = ");
        fields.push_bind_unseparated(value);
    }
    builder.push(" WHERE reading_id = ");
    builder.push_bind(id);

    let result = builder.build().execute(pool).await?;
    Ok(result.rows_affected())
}

/// Delete a reading. Returns the number of rows removed (0 when the id is
/// absent).
pub async fn delete_reading(pool: &SqlitePool, id: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM readings WHERE reading_id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
