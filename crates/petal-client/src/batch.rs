//! Sequential batch prediction.

use std::fmt;
use std::fs;
use std::path::Path;

use petal_core::Prediction;
use tracing::{info, warn};

use crate::{ClientError, PredictClient};

/// What to do when one item of a batch fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Report the failure and carry on with the next item.
    #[default]
    Continue,
    /// Stop at the first failure; later items are not sent.
    FailFast,
}

/// Result of one batch item.
#[derive(Debug)]
pub struct BatchOutcome {
    /// Position in the input list.
    pub index: usize,
    pub features: Vec<f64>,
    pub result: Result<Prediction, ClientError>,
}

impl fmt::Display for BatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values: Vec<String> = self.features.iter().map(|v| v.to_string()).collect();
        write!(f, "[{}] [{}] -> ", self.index, values.join(", "))?;
        match &self.result {
            Ok(prediction) => write!(f, "{}", prediction),
            Err(e) => write!(f, "error: {}", e),
        }
    }
}

/// Outcomes of a batch, in input order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<BatchOutcome>,
    /// Items never sent because the batch stopped early.
    pub skipped: usize,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    /// Successful predictions, in input order.
    pub fn predictions(&self) -> Vec<&Prediction> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().ok()).collect()
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} succeeded, {} failed", self.succeeded(), self.failed())?;
        if self.skipped > 0 {
            write!(f, ", {} skipped", self.skipped)?;
        }
        Ok(())
    }
}

/// Sends each input in order, awaiting every response before the next
/// request.
pub async fn run_batch(
    client: &PredictClient,
    inputs: &[Vec<f64>],
    policy: ErrorPolicy,
) -> BatchReport {
    let mut report = BatchReport::default();

    for (index, features) in inputs.iter().enumerate() {
        let result = client.predict(features).await;

        if let Err(e) = &result {
            warn!(index, "Prediction failed: {}", e);
        }
        let failed = result.is_err();
        report.outcomes.push(BatchOutcome { index, features: features.clone(), result });

        if failed && policy == ErrorPolicy::FailFast {
            report.skipped = inputs.len() - index - 1;
            break;
        }
    }

    info!(
        total = inputs.len(),
        succeeded = report.succeeded(),
        failed = report.failed(),
        skipped = report.skipped,
        "Batch finished"
    );
    report
}

/// Reads a JSON array of feature arrays, e.g. `[[5.1, 3.5, 1.4, 0.2]]`.
///
/// Inner arrays are not length-checked here; the service rejects bad shapes
/// per item.
pub fn load_inputs(path: &Path) -> Result<Vec<Vec<f64>>, ClientError> {
    let input_err = |reason: String| ClientError::Input { path: path.to_path_buf(), reason };

    let content = fs::read_to_string(path).map_err(|e| input_err(e.to_string()))?;
    serde_json::from_str(&content).map_err(|e| input_err(e.to_string()))
}

/// One specimen of each species plus a borderline case.
pub fn default_samples() -> Vec<Vec<f64>> {
    vec![
        vec![5.1, 3.5, 1.4, 0.2],
        vec![7.0, 3.2, 4.7, 1.4],
        vec![6.7, 3.0, 5.2, 2.3],
        vec![5.9, 3.0, 5.1, 1.8],
    ]
}
