#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Account {
    pub account_id: i64,
    pub first_name: String,
    pub last_name: String,
}
