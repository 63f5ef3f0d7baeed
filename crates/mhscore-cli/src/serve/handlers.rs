use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Serialize;

use mhscore_pipeline::guidance::RiskBand;
use mhscore_pipeline::inference::RawRecord;

use crate::serve::error::ApiError;
use crate::serve::AppState;

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub predicted_score: i64,
    pub risk_band: RiskBand,
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    model: String,
}

pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<RawRecord>, JsonRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let Json(record) = payload?;
    let prediction = state.context.predict_record(record)?;
    log::debug!(
        "Predicted {} (raw {:.3}, fallbacks {:?})",
        prediction.score,
        prediction.raw,
        prediction.fallback_columns
    );

    Ok(Json(PredictResponse {
        predicted_score: prediction.score,
        risk_band: prediction.band,
    }))
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        model: state.context.model_name().to_string(),
    })
}
