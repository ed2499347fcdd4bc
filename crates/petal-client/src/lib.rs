//! Client for the petal prediction service.
//!
//! [`PredictClient`] wraps the two HTTP operations; [`run_batch`] drives a
//! list of feature vectors through `POST /predict` one request at a time.

mod batch;
mod client;

pub use batch::{default_samples, load_inputs, run_batch, BatchOutcome, BatchReport, ErrorPolicy};
pub use client::PredictClient;

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced to the caller of a single request.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The service could not be reached or the exchange broke off.
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("Service returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The response body was not what the service promises.
    #[error("Invalid response: {0}")]
    Decode(String),

    /// The batch input file could not be used.
    #[error("Failed to read input {}: {reason}", path.display())]
    Input { path: PathBuf, reason: String },
}
