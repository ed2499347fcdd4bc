//! Application error types and Axum response conversion.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use petal_core::PetalError;
use serde::Serialize;

/// serde_json's message for a number literal that does not fit the target type.
const NUMBER_OUT_OF_RANGE: &str = "number out of range";

/// Application-level errors with HTTP status code mapping.
#[derive(Debug)]
pub enum AppError {
    /// Well-formed JSON whose content fails validation (422).
    Validation(String),
    /// Unparseable request body (400).
    BadRequest(String),
    /// Body sent without a JSON content type (415).
    UnsupportedMediaType(String),
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        let message = rejection.body_text();
        match rejection {
            JsonRejection::JsonDataError(_) => AppError::Validation(message),
            // Literals like 1e400 are valid JSON but overflow f64.
            JsonRejection::JsonSyntaxError(_) if message.contains(NUMBER_OUT_OF_RANGE) => {
                AppError::Validation(message)
            }
            JsonRejection::MissingJsonContentType(_) => AppError::UnsupportedMediaType(message),
            _ => AppError::BadRequest(message),
        }
    }
}

impl From<PetalError> for AppError {
    fn from(e: PetalError) -> Self {
        match e {
            PetalError::Validation(_) => AppError::Validation(e.to_string()),
            _ => AppError::Internal(e.to_string()),
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            AppError::Validation(m)
            | AppError::BadRequest(m)
            | AppError::UnsupportedMediaType(m)
            | AppError::Internal(m) => m,
        };
        if status.is_server_error() {
            tracing::error!("Request failed: {}", message);
        }
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
