//! Core domain types and error definitions for petal.
//!
//! This crate provides the types shared by the server, the trainer and the
//! batch client:
//!
//! - [`FeatureVector`] — The four measurements describing one flower
//! - [`Prediction`] — A class label produced by a [`Classifier`]
//! - [`Classifier`] — The inference seam the server is written against
//! - [`DecisionTree`] — The classifier persisted as the model artifact
//! - [`PetalError`] — Error type for validation, artifact and inference failures
//!
//! # Example
//!
//! ```rust
//! use petal_core::{Classifier, DecisionTree, FeatureVector, Leaf, Split, TreeNode};
//!
//! let tree = DecisionTree::new(
//!     vec!["setosa".into(), "versicolor".into()],
//!     TreeNode::Split(Split {
//!         feature: 2,
//!         threshold: 2.45,
//!         left: Box::new(TreeNode::Leaf(Leaf { class_index: 0, samples: 50 })),
//!         right: Box::new(TreeNode::Leaf(Leaf { class_index: 1, samples: 50 })),
//!     }),
//! )
//! .unwrap();
//!
//! let features = FeatureVector::new([5.1, 3.5, 1.4, 0.2]).unwrap();
//! assert_eq!(tree.predict(&features).unwrap().label(), "setosa");
//! ```

mod tree;

pub use tree::{DecisionTree, Leaf, Split, TreeNode, FORMAT_VERSION};

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of measurements in a [`FeatureVector`].
pub const FEATURE_COUNT: usize = 4;

/// Positional names of the measurements, in [`FeatureVector`] order.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] =
    ["sepal_length", "sepal_width", "petal_length", "petal_width"];

/// Errors that can occur while validating input, loading an artifact or
/// running inference.
#[derive(Error, Debug)]
pub enum PetalError {
    /// Input failed validation.
    #[error("Invalid features: {0}")]
    Validation(String),

    /// Artifact file could not be read or written.
    #[error("Artifact I/O error at {}: {source}", path.display())]
    ArtifactIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Artifact content is corrupt or inconsistent.
    #[error("Invalid artifact at {}: {reason}", path.display())]
    ArtifactFormat { path: PathBuf, reason: String },

    /// Inference failed on structurally valid input.
    #[error("Inference failed: {0}")]
    Inference(String),
}

/// One flower specimen: sepal length, sepal width, petal length and petal
/// width, in that order.
///
/// The length is fixed by the type; construction rejects NaN and infinities.
/// Deserializes from a JSON array of exactly four numbers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; FEATURE_COUNT]", into = "[f64; FEATURE_COUNT]")]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    /// Creates a feature vector, rejecting non-finite values.
    pub fn new(values: [f64; FEATURE_COUNT]) -> Result<Self, PetalError> {
        if let Some(idx) = values.iter().position(|v| !v.is_finite()) {
            return Err(PetalError::Validation(format!(
                "{} must be a finite number, got {}",
                FEATURE_NAMES[idx], values[idx]
            )));
        }
        Ok(Self(values))
    }

    /// Creates a feature vector from a slice that must hold exactly four values.
    pub fn from_slice(values: &[f64]) -> Result<Self, PetalError> {
        let array: [f64; FEATURE_COUNT] = values.try_into().map_err(|_| {
            PetalError::Validation(format!(
                "expected {} values, got {}",
                FEATURE_COUNT,
                values.len()
            ))
        })?;
        Self::new(array)
    }

    /// Returns the measurement at `idx`, if in range.
    pub fn get(&self, idx: usize) -> Option<f64> {
        self.0.get(idx).copied()
    }

    pub fn as_array(&self) -> &[f64; FEATURE_COUNT] {
        &self.0
    }
}

impl TryFrom<[f64; FEATURE_COUNT]> for FeatureVector {
    type Error = PetalError;

    fn try_from(values: [f64; FEATURE_COUNT]) -> Result<Self, Self::Error> {
        Self::new(values)
    }
}

impl From<FeatureVector> for [f64; FEATURE_COUNT] {
    fn from(features: FeatureVector) -> Self {
        features.0
    }
}

impl fmt::Display for FeatureVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.0;
        write!(f, "[{}, {}, {}, {}]", a, b, c, d)
    }
}

/// A class label produced by a [`Classifier`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Prediction(String);

impl Prediction {
    pub fn label(&self) -> &str {
        &self.0
    }

    pub fn into_label(self) -> String {
        self.0
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Read-only description of a loaded classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Positional feature names the model was trained on.
    pub feature_names: Vec<String>,
    /// The closed set of labels the model can emit.
    pub labels: Vec<String>,
    /// Tree depth, for tree-based models.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth: Option<usize>,
    /// Number of leaves, for tree-based models.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leaves: Option<usize>,
}

/// Trait for models that classify a [`FeatureVector`].
///
/// Implementations are immutable after construction and shared read-only
/// across request handlers.
pub trait Classifier: Send + Sync {
    /// Classifies one specimen. The returned label is always a member of
    /// [`ModelInfo::labels`].
    fn predict(&self, features: &FeatureVector) -> Result<Prediction, PetalError>;

    /// Describes the model.
    fn info(&self) -> ModelInfo;
}
