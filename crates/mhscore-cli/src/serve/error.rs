use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use mhscore_pipeline::PipelineError;

/// Per-request failure. Always answered with 400 and `{"error": ...}`.
#[derive(Debug)]
pub enum ApiError {
    /// Body was not a JSON object.
    InvalidBody(String),
    Pipeline(PipelineError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match &self {
            ApiError::InvalidBody(msg) => {
                log::warn!("Rejected request body: {}", msg);
                msg.clone()
            }
            ApiError::Pipeline(err) if err.is_client_error() => {
                log::warn!("Prediction request failed: {}", err);
                err.to_string()
            }
            ApiError::Pipeline(err) => {
                log::error!("Prediction failed: {}", err);
                err.to_string()
            }
        };

        (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        ApiError::Pipeline(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidBody(rejection.body_text())
    }
}
