//! Bulk CSV ingestion for meter readings.
//!
//! The whole file is decoded into typed rows up front; a row that fails to
//! decode fails the request before anything is persisted. Accepted rows are
//! then processed strictly in file order, one at a time, each validated
//! against the state left behind by the rows before it and committed
//! immediately on success. A later row can therefore be rejected as a
//! duplicate of, or as older than, an earlier row of the same file.

use customer_client::db::reading_queries;
use customer_client::domain::ReadingCandidate;
use serde::Deserialize;
use sqlx::SqlitePool;
use time::format_description::FormatItem;
use time::macros::format_description;
use time::PrimitiveDateTime;

use crate::models::UploadResults;
use crate::validate;

/// Expected header: `AccountId,MeterReadingDateTime,MeterReadValue`.
#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(rename = "AccountId")]
    account_id: i64,
    #[serde(rename = "MeterReadingDateTime")]
    reading_datetime: String,
    #[serde(rename = "MeterReadValue")]
    meter_read_value: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("failed to read csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: {message}")]
    Row { row: usize, message: String },
}

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Db(#[from] anyhow::Error),
}

const ISO_SECONDS: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
const ISO_MINUTES: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]");
const DAY_FIRST: &[FormatItem<'static>] =
    format_description!("[day]/[month]/[year] [hour]:[minute]");

/// Parse a reading timestamp in one of the fixed, locale-independent forms
/// accepted on every entry point: `2023-01-01T09:24:00`,
/// `2023-01-01T09:24`, or `22/04/2019 09:24`.
pub fn parse_reading_datetime(raw: &str) -> Result<PrimitiveDateTime, String> {
    let raw = raw.trim();
    for format in [ISO_SECONDS, ISO_MINUTES, DAY_FIRST] {
        if let Ok(parsed) = PrimitiveDateTime::parse(raw, format) {
            return Ok(parsed);
        }
    }
    Err(format!("unrecognised reading date '{raw}'"))
}

pub fn format_reading_datetime(datetime: PrimitiveDateTime) -> String {
    datetime
        .format(ISO_SECONDS)
        .unwrap_or_else(|_| datetime.to_string())
}

/// Strictly decode the whole file into candidates, preserving file order.
pub fn parse_rows(data: &[u8]) -> Result<Vec<ReadingCandidate>, ParseError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(data);

    let mut rows = Vec::new();
    for (index, record) in reader.deserialize::<RawRow>().enumerate() {
        let raw = record?;
        let reading_datetime =
            parse_reading_datetime(&raw.reading_datetime).map_err(|message| ParseError::Row {
                row: index + 1,
                message,
            })?;

        rows.push(ReadingCandidate {
            account_id: raw.account_id,
            reading_datetime,
            meter_read_value: raw.meter_read_value,
        });
    }

    Ok(rows)
}

/// Run one uploaded file through the rule set, committing each accepted row
/// before looking at the next, and tally the outcome per row. Rule
/// rejections never abort the batch; a store failure does, leaving earlier
/// commits in place.
pub async fn ingest_readings(
    pool: &SqlitePool,
    data: &[u8],
) -> Result<UploadResults, IngestError> {
    let rows = parse_rows(data)?;

    let mut results = UploadResults {
        total_records: rows.len() as u32,
        ..UploadResults::default()
    };

    for candidate in &rows {
        match validate::check_reading(pool, candidate).await? {
            None => {
                reading_queries::insert_reading(pool, candidate).await?;
                results.successful += 1;
                metrics::counter!("upload_rows_accepted_total").increment(1);
            }
            Some(rejection) => {
                results.failed += 1;
                metrics::counter!("upload_rows_rejected_total").increment(1);
                tracing::debug!(
                    account_id = candidate.account_id,
                    reason = %rejection,
                    "rejected uploaded reading"
                );
            }
        }
    }

    Ok(results)
}
