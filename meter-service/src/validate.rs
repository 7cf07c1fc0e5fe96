//! The acceptance rules for candidate readings. The single-create endpoint
//! and the bulk upload pipeline both go through [`check_reading`], so a row
//! is judged the same way regardless of how it arrived.

use customer_client::db::{account_queries, reading_queries};
use customer_client::domain::ReadingCandidate;
use once_cell::sync::Lazy;
use regex::Regex;
use sqlx::SqlitePool;

static METER_VALUE_FORMAT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{5}$").expect("meter value pattern must compile"));

/// Why a candidate reading was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    UnknownAccount,
    NotLatestReading,
    DuplicateReading,
    InvalidFormat,
}

impl Rejection {
    /// Client-facing message for the create-reading error body.
    pub fn message(&self, candidate: &ReadingCandidate) -> String {
        match self {
            Self::UnknownAccount => {
                format!("Account with ID {} not found", candidate.account_id)
            }
            Self::NotLatestReading => {
                "An existing reading for this account has a later date".to_string()
            }
            Self::DuplicateReading => {
                "This reading has already been recorded for this account".to_string()
            }
            Self::InvalidFormat => "Meter read value must be in the format of NNNNN".to_string(),
        }
    }
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::UnknownAccount => "unknown account",
            Self::NotLatestReading => "not latest reading",
            Self::DuplicateReading => "duplicate reading",
            Self::InvalidFormat => "invalid format",
        })
    }
}

pub fn meter_value_is_valid(value: &str) -> bool {
    METER_VALUE_FORMAT.is_match(value)
}

/// Run the rules for one candidate against the current persisted state.
/// Returns the first rule that rejects it, in rule order, or `None` when
/// the candidate may be persisted.
pub async fn check_reading(
    pool: &SqlitePool,
    candidate: &ReadingCandidate,
) -> anyhow::Result<Option<Rejection>> {
    if !account_queries::account_exists(pool, candidate.account_id).await? {
        return Ok(Some(Rejection::UnknownAccount));
    }

    if let Some(latest) =
        reading_queries::latest_reading_datetime(pool, candidate.account_id).await?
    {
        // Only a strictly later existing reading rejects; an equal
        // timestamp passes and is left to the duplicate rule.
        if latest > candidate.reading_datetime {
            return Ok(Some(Rejection::NotLatestReading));
        }
    }

    if reading_queries::reading_exists(
        pool,
        candidate.account_id,
        candidate.reading_datetime,
        &candidate.meter_read_value,
    )
    .await?
    {
        return Ok(Some(Rejection::DuplicateReading));
    }

    if !meter_value_is_valid(&candidate.meter_read_value) {
        return Ok(Some(Rejection::InvalidFormat));
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;
    use customer_client::db::reading_queries;
    use time::macros::datetime;

    fn candidate(account_id: i64, dt: time::PrimitiveDateTime, value: &str) -> ReadingCandidate {
        ReadingCandidate {
            account_id,
            reading_datetime: dt,
            meter_read_value: value.to_string(),
        }
    }

    #[tokio::test]
    async fn unknown_account_is_rejected_before_anything_else() {
        let pool = test_support::pool().await;

        // Bad value too; the account rule must still win.
        let rejection = check_reading(&pool, &candidate(5, datetime!(2023-01-02 00:00), "7"))
            .await
            .unwrap();

        assert_eq!(rejection, Some(Rejection::UnknownAccount));
    }

    #[tokio::test]
    async fn earlier_than_an_existing_reading_is_rejected() {
        let pool = test_support::pool_with_accounts(&[1234]).await;
        reading_queries::insert_reading(
            &pool,
            &candidate(1234, datetime!(2023-01-01 00:00), "12345"),
        )
        .await
        .unwrap();

        let rejection = check_reading(
            &pool,
            &candidate(1234, datetime!(2022-01-01 00:00), "22345"),
        )
        .await
        .unwrap();

        assert_eq!(rejection, Some(Rejection::NotLatestReading));
    }

    #[tokio::test]
    async fn equal_timestamp_passes_the_monotonic_rule() {
        let pool = test_support::pool_with_accounts(&[1234]).await;
        let dt = datetime!(2023-01-01 00:00);
        reading_queries::insert_reading(&pool, &candidate(1234, dt, "12345"))
            .await
            .unwrap();

        // Same instant, different value: not a duplicate, not stale.
        let rejection = check_reading(&pool, &candidate(1234, dt, "12346"))
            .await
            .unwrap();

        assert_eq!(rejection, None);
    }

    #[tokio::test]
    async fn identical_pair_is_a_duplicate() {
        let pool = test_support::pool_with_accounts(&[1234]).await;
        let dt = datetime!(2023-01-01 00:00);
        reading_queries::insert_reading(&pool, &candidate(1234, dt, "12345"))
            .await
            .unwrap();

        let rejection = check_reading(&pool, &candidate(1234, dt, "12345"))
            .await
            .unwrap();

        assert_eq!(rejection, Some(Rejection::DuplicateReading));
    }

    #[tokio::test]
    async fn non_five_digit_values_fail_the_format_rule() {
        let pool = test_support::pool_with_accounts(&[1240]).await;

        for value in ["7", "abcde", "123456", "1234", "1234a", ""] {
            let rejection = check_reading(
                &pool,
                &candidate(1240, datetime!(2023-01-01 00:00), value),
            )
            .await
            .unwrap();
            assert_eq!(rejection, Some(Rejection::InvalidFormat), "value {value:?}");
        }
    }

    #[tokio::test]
    async fn a_clean_candidate_passes_every_rule() {
        let pool = test_support::pool_with_accounts(&[1234]).await;

        let rejection = check_reading(
            &pool,
            &candidate(1234, datetime!(2023-01-01 00:00), "12345"),
        )
        .await
        .unwrap();

        assert_eq!(rejection, None);
    }

    #[tokio::test]
    async fn readings_on_other_accounts_do_not_interfere() {
        let pool = test_support::pool_with_accounts(&[1234, 1239]).await;
        reading_queries::insert_reading(
            &pool,
            &candidate(1234, datetime!(2023-06-01 00:00), "12345"),
        )
        .await
        .unwrap();

        // 1239 has no readings; 1234's later reading must not gate it.
        let rejection = check_reading(
            &pool,
            &candidate(1239, datetime!(2023-01-01 00:00), "12345"),
        )
        .await
        .unwrap();

        assert_eq!(rejection, None);
    }
}
