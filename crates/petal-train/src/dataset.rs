//! CSV loading for labelled specimens.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use petal_core::{FeatureVector, FEATURE_COUNT};
use tracing::debug;

use crate::TrainError;

/// Labelled training data.
///
/// `targets[i]` indexes into `labels` and belongs to `features[i]`. Labels are
/// kept in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub features: Vec<FeatureVector>,
    pub targets: Vec<usize>,
    pub labels: Vec<String>,
}

impl Dataset {
    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self, TrainError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| TrainError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let dataset = Self::from_reader(file)?;
        debug!(
            path = %path.display(),
            rows = dataset.len(),
            classes = dataset.labels.len(),
            "Loaded dataset"
        );
        Ok(dataset)
    }

    /// Parses `f1,f2,f3,f4,label` rows after a header line.
    pub fn parse_csv(content: &str) -> Result<Self, TrainError> {
        Self::from_reader(content.as_bytes())
    }

    /// Reads CSV from any source. Blank lines are skipped and fields may be
    /// quoted.
    pub fn from_reader(source: impl Read) -> Result<Self, TrainError> {
        let mut reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(source);

        let columns = reader.headers().map_err(|e| csv_error(&e, 1))?.len();
        if columns == 0 {
            return Err(TrainError::Empty);
        }
        if columns != FEATURE_COUNT + 1 {
            return Err(TrainError::Parse {
                line: 1,
                reason: format!("expected {} columns, got {}", FEATURE_COUNT + 1, columns),
            });
        }

        let mut dataset = Self::default();
        let mut record = StringRecord::new();
        loop {
            let line = reader.position().line() as usize;
            if !reader.read_record(&mut record).map_err(|e| csv_error(&e, line))? {
                break;
            }
            let line = record.position().map_or(line, |p| p.line() as usize);
            let (features, label) =
                parse_record(&record).map_err(|reason| TrainError::Parse { line, reason })?;
            dataset.push(features, label);
        }

        if dataset.is_empty() {
            return Err(TrainError::Empty);
        }
        Ok(dataset)
    }

    fn push(&mut self, features: FeatureVector, label: &str) {
        let target = match self.labels.iter().position(|l| l == label) {
            Some(target) => target,
            None => {
                self.labels.push(label.to_string());
                self.labels.len() - 1
            }
        };
        self.features.push(features);
        self.targets.push(target);
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

fn csv_error(e: &csv::Error, fallback_line: usize) -> TrainError {
    TrainError::Parse {
        line: e.position().map_or(fallback_line, |p| p.line() as usize),
        reason: e.to_string(),
    }
}

fn parse_record(record: &StringRecord) -> Result<(FeatureVector, &str), String> {
    if record.len() != FEATURE_COUNT + 1 {
        return Err(format!("expected {} columns, got {}", FEATURE_COUNT + 1, record.len()));
    }
    let label = &record[FEATURE_COUNT];
    if label.is_empty() {
        return Err("missing label".into());
    }

    let values = record
        .iter()
        .take(FEATURE_COUNT)
        .map(|v| v.parse::<f64>().map_err(|_| format!("{:?} is not a number", v)))
        .collect::<Result<Vec<_>, _>>()?;
    let features = FeatureVector::from_slice(&values).map_err(|e| e.to_string())?;

    Ok((features, label))
}
