//! One-time population of the accounts table from the embedded reference
//! list. Runs on every startup but only writes when the table is empty.

use customer_client::db::account_queries;
use customer_client::domain::Account;
use serde::Deserialize;
use sqlx::SqlitePool;

const SEED_ACCOUNTS_CSV: &str = include_str!("../data/test_accounts.csv");

#[derive(Debug, Deserialize)]
struct SeedAccount {
    #[serde(rename = "AccountId")]
    account_id: i64,
    #[serde(rename = "FirstName")]
    first_name: String,
    #[serde(rename = "LastName")]
    last_name: String,
}

/// Returns how many accounts were inserted (0 when the table was already
/// populated).
pub async fn seed_accounts(pool: &SqlitePool) -> anyhow::Result<usize> {
    if account_queries::account_count(pool).await? > 0 {
        return Ok(0);
    }

    let mut reader = csv::Reader::from_reader(SEED_ACCOUNTS_CSV.as_bytes());
    let mut inserted = 0usize;
    for record in reader.deserialize::<SeedAccount>() {
        let record = record?;
        account_queries::insert_account_with_id(
            pool,
            &Account {
                account_id: record.account_id,
                first_name: record.first_name,
                last_name: record.last_name,
            },
        )
        .await?;
        inserted += 1;
    }

    tracing::info!(inserted, "seeded reference accounts");
    Ok(inserted)
}
