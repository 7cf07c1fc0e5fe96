use time::PrimitiveDateTime;

/// A persisted meter reading. `meter_read_value` stays a string for its
/// whole lifetime; it is never re-parsed as a number.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Reading {
    pub reading_id: i64,
    pub account_id: i64,
    pub reading_datetime: PrimitiveDateTime,
    pub meter_read_value: String,
}

/// A reading that has been decoded but not yet accepted by the business
/// rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadingCandidate {
    pub account_id: i64,
    pub reading_datetime: PrimitiveDateTime,
    pub meter_read_value: String,
}
