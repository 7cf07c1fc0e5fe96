use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Failures surfaced to HTTP callers.
///
/// Business-rule rejections of candidate readings are not represented
/// here: per the create-reading contract they travel as a keyed
/// `{"error": ...}` body with a 400 status, and during bulk ingestion they
/// are recovered locally as part of the per-row tally.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The requested entity does not exist.
    #[error("{0}")]
    NotFound(String),
    /// Malformed input: a required field, length, or format violation.
    #[error("{0}")]
    Validation(String),
    /// The uploaded file was rejected before any row was looked at.
    #[error("{0}")]
    MalformedUpload(String),
    /// The uploaded file could not be decoded into typed rows.
    #[error("{0}")]
    Parse(String),
    /// Store or other internal failure. Details are logged, not leaked.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
            Self::Validation(m) | Self::MalformedUpload(m) | Self::Parse(m) => {
                (StatusCode::BAD_REQUEST, m.clone())
            }
            Self::Internal(e) => {
                tracing::error!(error = %e, "internal error while handling request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
