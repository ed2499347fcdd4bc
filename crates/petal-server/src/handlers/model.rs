//! Inference HTTP handlers.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use petal_core::{FeatureVector, ModelInfo};
use tracing::{debug, warn};

use crate::dto::{PredictRequest, PredictResponse};
use crate::error::AppError;
use crate::ServerState;

/// POST /predict - Classify one feature vector.
pub async fn predict(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<PredictResponse>, AppError> {
    let Json(req) = payload.map_err(|rejection| {
        warn!("Rejected predict request: {}", rejection.body_text());
        AppError::from(rejection)
    })?;

    let features = FeatureVector::from_slice(&req.features).map_err(|e| {
        warn!("Rejected predict request: {}", e);
        AppError::from(e)
    })?;

    let prediction = state.classifier.predict(&features)?;
    debug!(%features, %prediction, "Prediction served");

    Ok(Json(PredictResponse { prediction }))
}

/// GET /model - Describe the loaded model.
pub async fn info(State(state): State<Arc<ServerState>>) -> Json<ModelInfo> {
    Json(state.classifier.info())
}
