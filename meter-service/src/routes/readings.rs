use axum::{
    body::Bytes,
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use customer_client::db::reading_queries;
use customer_client::domain::ReadingCandidate;
use serde_json::json;

use super::AppState;
use crate::error::ApiError;
use crate::ingest::{self, IngestError};
use crate::models::{CreateReadingModel, EditReadingModel, ReadingDto, UploadResults};
use crate::validate;

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<ReadingDto>>, ApiError> {
    let readings = reading_queries::all_readings(&state.pool).await?;
    Ok(Json(readings.into_iter().map(ReadingDto::from).collect()))
}

pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ReadingDto>, ApiError> {
    match reading_queries::find_reading(&state.pool, id).await? {
        Some(reading) => Ok(Json(reading.into())),
        None => Err(ApiError::NotFound(format!(
            "Reading with ID {id} not found"
        ))),
    }
}

/// Create one reading through the shared rule set. A rule rejection is a
/// 400 with a keyed `{"error": ...}` body; success is a 201 with the
/// generated id.
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateReadingModel>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let reading_datetime =
        ingest::parse_reading_datetime(&body.reading_date_time).map_err(ApiError::Validation)?;

    let candidate = ReadingCandidate {
        account_id: body.account_id,
        reading_datetime,
        meter_read_value: body.meter_read_value,
    };

    match validate::check_reading(&state.pool, &candidate).await? {
        Some(rejection) => {
            metrics::counter!("readings_create_rejected_total").increment(1);
            Ok((
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": rejection.message(&candidate) })),
            ))
        }
        None => {
            let id = reading_queries::insert_reading(&state.pool, &candidate).await?;
            metrics::counter!("readings_created_total").increment(1);
            Ok((StatusCode::CREATED, Json(json!({ "readingId": id }))))
        }
    }
}

/// Edit a reading's date and value. The owning account is immutable; the
/// model has no account field to change.
pub async fn edit(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<EditReadingModel>,
) -> Result<StatusCode, ApiError> {
    if body.reading_id != id {
        return Err(ApiError::Validation(
            "The meter reading IDs do not match".to_string(),
        ));
    }

    let reading_datetime =
        ingest::parse_reading_datetime(&body.reading_date_time).map_err(ApiError::Validation)?;

    if !validate::meter_value_is_valid(&body.meter_read_value) {
        return Err(ApiError::Validation(
            "Meter read value must be in the format of NNNNN".to_string(),
        ));
    }

    let Some(existing) = reading_queries::find_reading(&state.pool, id).await? else {
        return Err(ApiError::NotFound(format!("Reading with ID {id} not found")));
    };

    let new_datetime =
        (existing.reading_datetime != reading_datetime).then_some(reading_datetime);
    let new_value = (existing.meter_read_value != body.meter_read_value)
        .then_some(body.meter_read_value.as_str());
    reading_queries::update_reading(&state.pool, id, new_datetime, new_value).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let removed = reading_queries::delete_reading(&state.pool, id).await?;
    if removed == 0 {
        return Err(ApiError::NotFound(format!("Reading with ID {id} not found")));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Bulk upload: multipart form with the file under `formFile`, CSV only.
/// The file is rejected outright (nothing counted) when missing, empty, or
/// not named `*.csv`.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResults>, ApiError> {
    metrics::counter!("upload_requests_total").increment(1);

    let mut file: Option<(String, Bytes)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::MalformedUpload(format!("invalid multipart request: {e}")))?
    {
        if field.name() == Some("formFile") {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::MalformedUpload(format!("failed to read upload: {e}")))?;
            file = Some((file_name, data));
            break;
        }
    }

    let Some((file_name, data)) = file else {
        return Err(ApiError::MalformedUpload("A file is required".to_string()));
    };
    if data.is_empty() {
        return Err(ApiError::MalformedUpload(
            "The file provided is empty".to_string(),
        ));
    }
    if !file_name.to_ascii_lowercase().ends_with(".csv") {
        return Err(ApiError::MalformedUpload("The file must be a CSV".to_string()));
    }

    let results = ingest::ingest_readings(&state.pool, &data)
        .await
        .map_err(|e| match e {
            IngestError::Parse(parse) => ApiError::Parse(parse.to_string()),
            IngestError::Db(db) => ApiError::Internal(db),
        })?;

    Ok(Json(results))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;
    use customer_client::db::reading_queries;
    use time::macros::datetime;

    async fn create_body(
        state: &AppState,
        account_id: i64,
        date: &str,
        value: &str,
    ) -> (StatusCode, serde_json::Value) {
        let (status, Json(body)) = create(
            State(state.clone()),
            Json(CreateReadingModel {
                account_id,
                reading_date_time: date.to_string(),
                meter_read_value: value.to_string(),
            }),
        )
        .await
        .unwrap();
        (status, body)
    }

    #[tokio::test]
    async fn create_returns_the_generated_id() {
        let pool = test_support::pool_with_accounts(&[1234]).await;
        let state = AppState { pool };

        let (status, body) = create_body(&state, 1234, "2023-01-01T00:00", "12345").await;

        assert_eq!(status, StatusCode::CREATED);
        let id = body["readingId"].as_i64().unwrap();
        assert!(id > 0);

        let Json(dto) = get_by_id(State(state), Path(id)).await.unwrap();
        assert_eq!(dto.account_id, 1234);
        assert_eq!(dto.meter_read_value, "12345");
        assert_eq!(dto.reading_date_time, "2023-01-01T00:00:00");
    }

    #[tokio::test]
    async fn rule_rejections_come_back_as_keyed_error_bodies() {
        let pool = test_support::pool_with_accounts(&[1234]).await;
        let state = AppState { pool: pool.clone() };

        let (status, body) = create_body(&state, 5, "2023-01-02T00:00", "32345").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Account with ID 5 not found");
        assert!(reading_queries::all_readings(&pool).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn single_create_and_upload_judge_rows_identically() {
        let pool = test_support::pool_with_accounts(&[1234]).await;
        let state = AppState { pool };

        let (first, _) = create_body(&state, 1234, "2023-01-01T00:00", "12345").await;
        let (second, body) = create_body(&state, 1234, "2023-01-01T00:00", "12345").await;
        let (third, _) = create_body(&state, 1234, "2022-01-01T00:00", "22345").await;

        assert_eq!(first, StatusCode::CREATED);
        assert_eq!(second, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"],
            "This reading has already been recorded for this account"
        );
        assert_eq!(third, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn an_unparseable_date_is_a_validation_failure() {
        let pool = test_support::pool_with_accounts(&[1234]).await;
        let state = AppState { pool };

        let result = create(
            State(state),
            Json(CreateReadingModel {
                account_id: 1234,
                reading_date_time: "yesterday".to_string(),
                meter_read_value: "12345".to_string(),
            }),
        )
        .await;

        assert!(matches!(result, Err(ApiError::Validation(_))));
    }

    #[tokio::test]
    async fn edit_rewrites_date_and_value_only_when_they_differ() {
        let pool = test_support::pool_with_accounts(&[1234]).await;
        let state = AppState { pool: pool.clone() };

        let id = reading_queries::insert_reading(
            &pool,
            &ReadingCandidate {
                account_id: 1234,
                reading_datetime: datetime!(2023-01-01 00:00),
                meter_read_value: "12345".to_string(),
            },
        )
        .await
        .unwrap();

        let status = edit(
            State(state),
            Path(id),
            Json(EditReadingModel {
                reading_id: id,
                reading_date_time: "2023-02-01T00:00".to_string(),
                meter_read_value: "54321".to_string(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        let reading = reading_queries::find_reading(&pool, id).await.unwrap().unwrap();
        assert_eq!(reading.reading_datetime, datetime!(2023-02-01 00:00));
        assert_eq!(reading.meter_read_value, "54321");
        assert_eq!(reading.account_id, 1234);
    }

    #[tokio::test]
    async fn edit_enforces_the_value_format() {
        let pool = test_support::pool_with_accounts(&[1234]).await;
        let state = AppState { pool: pool.clone() };

        let id = reading_queries::insert_reading(
            &pool,
            &ReadingCandidate {
                account_id: 1234,
                reading_datetime: datetime!(2023-01-01 00:00),
                meter_read_value: "12345".to_string(),
            },
        )
        .await
        .unwrap();

        let result = edit(
            State(state),
            Path(id),
            Json(EditReadingModel {
                reading_id: id,
                reading_date_time: "2023-02-01T00:00".to_string(),
                meter_read_value: "54".to_string(),
            }),
        )
        .await;

        assert!(matches!(result, Err(ApiError::Validation(_))));
    }

    #[tokio::test]
    async fn edit_rejects_mismatched_ids() {
        let pool = test_support::pool_with_accounts(&[1234]).await;
        let state = AppState { pool };

        let result = edit(
            State(state),
            Path(1),
            Json(EditReadingModel {
                reading_id: 2,
                reading_date_time: "2023-02-01T00:00".to_string(),
                meter_read_value: "54321".to_string(),
            }),
        )
        .await;

        assert!(matches!(result, Err(ApiError::Validation(_))));
    }

    #[tokio::test]
    async fn delete_of_a_missing_reading_is_not_found() {
        let pool = test_support::pool().await;
        let state = AppState { pool };

        let result = delete(State(state), Path(42)).await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }
}
