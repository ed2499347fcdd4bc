use petal_core::Prediction;
use serde::{Deserialize, Serialize};

// === HTTP DTOs ===

#[derive(Debug, Serialize, Deserialize)]
pub struct WelcomeResponse {
    pub message: String,
}

/// Body of `POST /predict`. Length and finiteness are checked when the
/// values are turned into a `FeatureVector`.
#[derive(Debug, Serialize, Deserialize)]
pub struct PredictRequest {
    pub features: Vec<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PredictResponse {
    pub prediction: Prediction,
}
