use anyhow::Result;
use sqlx::{Sqlite, SqlitePool, QueryBuilder};

use crate::domain::Account;

pub async fn all_accounts(pool: &SqlitePool) -> Result<Vec<Account>> {
    let rows = sqlx::query_as::<_, Account>(
        r#"
        SELECT account_id, first_name, last_name
        FROM accounts
        ORDER BY account_id
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

pub async fn find_account(pool: &SqlitePool, id: i64) -> Result<Option<Account>> {
    let row = sqlx::query_as::<_, Account>(
        r#"
        SELECT account_id, first_name, last_name
        FROM accounts
        WHERE account_id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

pub async fn account_exists(pool: &SqlitePool, id: i64) -> Result<bool> {
    let exists: i64 =
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM accounts WHERE account_id = ?)")
            .bind(id)
            .fetch_one(pool)
            .await?;

    Ok(exists != 0)
}

pub async fn account_count(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM accounts")
        .fetch_one(pool)
        .await?;

    Ok(count)
}

/// Insert an account and return its generated id.
pub async fn insert_account(pool: &SqlitePool, first_name: &str, last_name: &str) -> Result<i64> {
    let result = sqlx::query("INSERT INTO accounts (first_name, last_name) VALUES (?, ?)")
        .bind(first_name)
        .bind(last_name)
        .execute(pool)
        .await?;

    Ok(result.last_insert_rowid())
}

/// Insert an account under a caller-chosen id. Used when loading the
/// reference account list into an empty database.
pub async fn insert_account_with_id(pool: &SqlitePool, account: &Account) -> Result<()> {
    sqlx::query("INSERT INTO accounts (account_id, first_name, last_name) VALUES (?, ?, ?)")
        .bind(account.account_id)
        .bind(&account.first_name)
        .bind(&account.last_name)
        .execute(pool)
        .await?;

    Ok(())
}

/// Write only the fields given as `Some`. Callers pass `None` for fields
/// whose stored value already matches, so an unchanged edit touches no row
/// at all. Returns the number of rows written.
pub async fn update_account(
    pool: &SqlitePool,
    id: i64,
    first_name: Option<&str>,
    last_name: Option<&str>,
) -> Result<u64> {
    if first_name.is_none() && last_name.is_none() {
        return Ok(0);
    }

    let mut builder = QueryBuilder::<Sqlite>::new("UPDATE accounts SET ");
    let mut fields = builder.separated(", ");
    if let Some(value) = first_name {
        fields.push("first_name = ");
        fields.push_bind_unseparated(value);
    }
    if let Some(value) = last_name {
        fields.push("last_name = ");
        fields.push_bind_unseparated(value);
    }
    builder.push(" WHERE account_id = ");
    builder.push_bind(id);

    let result = builder.build().execute(pool).await?;
    Ok(result.rows_affected())
}

/// Delete an account; readings cascade at the store level. Returns the
/// number of account rows removed (0 when the id is absent).
pub async fn delete_account(pool: &SqlitePool, id: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM accounts WHERE account_id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
