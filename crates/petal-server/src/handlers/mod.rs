//! HTTP route handlers for the prediction service.

pub mod model;

use axum::Json;

use crate::dto::WelcomeResponse;

pub const WELCOME_MESSAGE: &str = "Welcome to the Iris classification API";

/// GET / - Static greeting confirming the service is up.
pub async fn welcome() -> Json<WelcomeResponse> {
    Json(WelcomeResponse { message: WELCOME_MESSAGE.to_string() })
}

/// Health check endpoint.
pub async fn health() -> &'static str {
    "OK"
}
