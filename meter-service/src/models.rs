//! External request/response shapes. Database structs never cross the HTTP
//! boundary directly; everything is mapped through these.

use customer_client::domain::{Account, Reading};
use serde::{Deserialize, Serialize};

use crate::ingest::format_reading_datetime;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDto {
    pub account_id: i64,
    pub first_name: String,
    pub last_name: String,
}

impl From<Account> for AccountDto {
    fn from(account: Account) -> Self {
        Self {
            account_id: account.account_id,
            first_name: account.first_name,
            last_name: account.last_name,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountModel {
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditAccountModel {
    pub account_id: i64,
    pub first_name: String,
    pub last_name: String,
}

/// The reading datetime travels as a string in the fixed ISO form; the
/// meter value as the exact stored 5-character string.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingDto {
    pub reading_id: i64,
    pub account_id: i64,
    pub reading_date_time: String,
    pub meter_read_value: String,
}

impl From<Reading> for ReadingDto {
    fn from(reading: Reading) -> Self {
        Self {
            reading_id: reading.reading_id,
            account_id: reading.account_id,
            reading_date_time: format_reading_datetime(reading.reading_datetime),
            meter_read_value: reading.meter_read_value,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReadingModel {
    pub account_id: i64,
    pub reading_date_time: String,
    pub meter_read_value: String,
}

/// Edits never carry an account id; a reading keeps its owning account for
/// life.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditReadingModel {
    pub reading_id: i64,
    pub reading_date_time: String,
    pub meter_read_value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResults {
    pub successful: u32,
    pub failed: u32,
    pub total_records: u32,
}
