//! HTTP client for the prediction service.

use petal_core::Prediction;
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::ClientError;

#[derive(Serialize)]
struct PredictRequest<'a> {
    features: &'a [f64],
}

#[derive(Deserialize)]
struct PredictResponse {
    prediction: Prediction,
}

#[derive(Deserialize)]
struct WelcomeResponse {
    message: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

/// Client for the prediction service.
#[derive(Debug, Clone)]
pub struct PredictClient {
    client: Client,
    base_url: String,
}

impl PredictClient {
    /// Creates a client for the service rooted at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client: Client::new(), base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET / - Returns the service greeting.
    pub async fn health(&self) -> Result<String, ClientError> {
        let response = self.client.get(format!("{}/", self.base_url)).send().await?;
        let welcome: WelcomeResponse = decode(response).await?;
        Ok(welcome.message)
    }

    /// POST /predict - Classifies one feature vector.
    ///
    /// Values are sent as given; length and type checks are the service's.
    pub async fn predict(&self, features: &[f64]) -> Result<Prediction, ClientError> {
        let response = self
            .client
            .post(format!("{}/predict", self.base_url))
            .json(&PredictRequest { features })
            .send()
            .await?;

        let body: PredictResponse = decode(response).await?;
        debug!(?features, prediction = %body.prediction, "Received prediction");
        Ok(body.prediction)
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .map(|e| e.error)
            .unwrap_or(body);
        return Err(ClientError::Status { status: status.as_u16(), message });
    }

    serde_json::from_str(&body).map_err(|e| ClientError::Decode(e.to_string()))
}

#[cfg(test)]
pub(crate) mod tests {
    use std::path::Path;
    use std::sync::Arc;

    use petal_server::{build_router, ServerState};

    use super::*;

    /// Serves the bundled model on an ephemeral port and returns its base URL.
    pub(crate) async fn spawn_server() -> String {
        let model = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../model/iris_model.json");
        let state = ServerState::load(&model).unwrap();
        let app = build_router(Arc::new(state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    /// A base URL nothing is listening on.
    pub(crate) async fn closed_url() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_health() {
        let client = PredictClient::new(spawn_server().await);
        let message = client.health().await.unwrap();
        assert_eq!(message, "Welcome to the Iris classification API");
    }

    #[tokio::test]
    async fn test_predict() {
        let client = PredictClient::new(spawn_server().await);
        let setosa = client.predict(&[5.1, 3.5, 1.4, 0.2]).await.unwrap();
        let virginica = client.predict(&[6.7, 3.0, 5.2, 2.3]).await.unwrap();
        assert_eq!(setosa.label(), "setosa");
        assert_eq!(virginica.label(), "virginica");
    }

    #[tokio::test]
    async fn test_predict_validation_error() {
        let client = PredictClient::new(spawn_server().await);
        match client.predict(&[5.1, 3.5, 1.4]).await.unwrap_err() {
            ClientError::Status { status, message } => {
                assert_eq!(status, 422);
                assert_eq!(message, "Invalid features: expected 4 values, got 3");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_service() {
        let client = PredictClient::new(closed_url().await);
        let err = client.predict(&[5.1, 3.5, 1.4, 0.2]).await.unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)));
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = PredictClient::new("http://localhost:8000/");
        assert_eq!(client.base_url(), "http://localhost:8000");
    }
}
