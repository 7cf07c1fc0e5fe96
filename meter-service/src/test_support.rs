use customer_client::db::{self, account_queries};
use customer_client::domain::Account;
use sqlx::SqlitePool;

/// Fresh in-memory customer database. A single connection keeps it alive
/// for the whole test.
pub(crate) async fn pool() -> SqlitePool {
    let pool = db::connect("sqlite::memory:", 1).await.expect("in-memory pool");
    db::init_schema(&pool).await.expect("schema");
    pool
}

pub(crate) async fn pool_with_accounts(ids: &[i64]) -> SqlitePool {
    let pool = pool().await;
    for id in ids {
        account_queries::insert_account_with_id(
            &pool,
            &Account {
                account_id: *id,
                first_name: format!("Holder{id}"),
                last_name: "Test".to_string(),
            },
        )
        .await
        .expect("seed account");
    }
    pool
}
