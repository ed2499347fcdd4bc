//! HTTP prediction service for petal.
//!
//! [`ServerState`] owns the classifier, loaded once at startup, and is handed
//! to every handler through axum's `State`. [`build_router`] wires the routes
//! so both the binary and the tests drive the same application.

pub mod dto;
pub mod error;
pub mod handlers;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::routing::{get, post};
use axum::Router;
use petal_core::{Classifier, DecisionTree, PetalError};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

pub struct ServerState {
    pub classifier: Arc<dyn Classifier>,
}

impl ServerState {
    pub fn new(classifier: impl Classifier + 'static) -> Self {
        Self { classifier: Arc::new(classifier) }
    }

    /// Loads the model artifact. Any failure here must stop startup.
    pub fn load(model_path: &Path) -> Result<Self, PetalError> {
        let model = DecisionTree::load(model_path)?;
        Ok(Self::new(model))
    }
}

pub fn build_router(state: Arc<ServerState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request<Body>| {
            tracing::info_span!(
                "request",
                method = %req.method(),
                uri = %req.uri(),
                request_id = %Uuid::new_v4(),
            )
        })
        .on_response(|res: &Response<Body>, latency: Duration, _span: &tracing::Span| {
            info!(
                latency = %format!("{} ms", latency.as_millis()),
                status = %res.status().as_u16(),
                "finished processing request"
            );
        });

    let logged_routes = Router::new()
        .route("/", get(handlers::welcome))
        .route("/predict", post(handlers::model::predict))
        .route("/model", get(handlers::model::info))
        .layer(trace_layer);

    Router::new()
        .merge(logged_routes)
        .route("/health", get(handlers::health))
        .layer(cors)
        .with_state(state)
}
