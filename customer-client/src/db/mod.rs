pub mod account_queries;
pub mod reading_queries;

use std::str::FromStr;

use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

const CREATE_ACCOUNTS: &str = r#"
CREATE TABLE IF NOT EXISTS accounts (
    account_id INTEGER PRIMARY KEY AUTOINCREMENT,
    first_name TEXT NOT NULL,
    last_name  TEXT NOT NULL
)
"#;

const CREATE_READINGS: &str = r#"
CREATE TABLE IF NOT EXISTS readings (
    reading_id       INTEGER PRIMARY KEY AUTOINCREMENT,
    account_id       INTEGER NOT NULL
        REFERENCES accounts (account_id) ON DELETE CASCADE,
    reading_datetime TEXT NOT NULL,
    meter_read_value TEXT NOT NULL
)
"#;

const CREATE_READINGS_ACCOUNT_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_readings_account_id ON readings (account_id)";

/// Open a pool against the customer database. Foreign keys are enforced on
/// every connection so account deletion cascades to readings.
pub async fn connect(url: &str, max_connections: u32) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Create the customer schema if it does not exist yet. Safe to run on
/// every startup.
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(CREATE_ACCOUNTS).execute(pool).await?;
    sqlx::query(CREATE_READINGS).execute(pool).await?;
    sqlx::query(CREATE_READINGS_ACCOUNT_INDEX).execute(pool).await?;
    Ok(())
}

#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    // A single connection keeps the in-memory database alive for the whole
    // test.
    let pool = connect("sqlite::memory:", 1).await.expect("in-memory pool");
    init_schema(&pool).await.expect("schema");
    pool
}
