//! Offline training for petal.
//!
//! Reads the Iris measurements from CSV, fits a CART classification tree and
//! hands back a [`petal_core::DecisionTree`] ready to be saved as the model
//! artifact.

mod cart;
mod dataset;

pub use cart::{accuracy, fit, TrainParams};
pub use dataset::Dataset;

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading training data or fitting a model.
#[derive(Error, Debug)]
pub enum TrainError {
    #[error("Failed to read dataset {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("Dataset is empty")]
    Empty,

    #[error(transparent)]
    Model(#[from] petal_core::PetalError),
}
