//! CART tree induction with Gini impurity.
//!
//! Fitting is deterministic: candidate thresholds are midpoints between
//! consecutive distinct values, features and thresholds are scanned in
//! ascending order, and only a strictly better split replaces the current
//! best, so ties go to the lowest feature index and then the lowest
//! threshold. Majority-class ties go to the lowest class index.

use petal_core::{Classifier, DecisionTree, Leaf, PetalError, Split, TreeNode, FEATURE_COUNT};
use tracing::{debug, info};

use crate::{Dataset, TrainError};

/// Stopping rules for tree growth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrainParams {
    /// Maximum number of splits on any root-to-leaf path.
    pub max_depth: usize,
    /// Nodes with fewer samples than this become leaves.
    pub min_samples_split: usize,
}

impl Default for TrainParams {
    fn default() -> Self {
        Self { max_depth: 3, min_samples_split: 2 }
    }
}

impl TrainParams {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_min_samples_split(mut self, min_samples_split: usize) -> Self {
        self.min_samples_split = min_samples_split;
        self
    }
}

/// Fits a classification tree to `dataset`.
pub fn fit(dataset: &Dataset, params: &TrainParams) -> Result<DecisionTree, TrainError> {
    if dataset.is_empty() {
        return Err(TrainError::Empty);
    }

    let builder = TreeBuilder {
        dataset,
        params,
        class_count: dataset.labels.len(),
    };
    let indices: Vec<usize> = (0..dataset.len()).collect();
    let root = builder.build(&indices, 0);

    info!(
        rows = dataset.len(),
        classes = builder.class_count,
        depth = root.depth(),
        leaves = root.leaf_count(),
        "Fitted decision tree"
    );
    Ok(DecisionTree::new(dataset.labels.clone(), root)?)
}

/// Fraction of `dataset` rows the model labels correctly.
pub fn accuracy(model: &DecisionTree, dataset: &Dataset) -> Result<f64, PetalError> {
    if dataset.is_empty() {
        return Ok(0.0);
    }

    let mut correct = 0usize;
    for (features, &target) in dataset.features.iter().zip(&dataset.targets) {
        let predicted = model.predict(features)?;
        if dataset.labels.get(target).is_some_and(|l| l == predicted.label()) {
            correct += 1;
        }
    }
    Ok(correct as f64 / dataset.len() as f64)
}

struct TreeBuilder<'a> {
    dataset: &'a Dataset,
    params: &'a TrainParams,
    class_count: usize,
}

struct BestSplit {
    impurity: f64,
    feature: usize,
    threshold: f64,
}

impl TreeBuilder<'_> {
    fn build(&self, indices: &[usize], depth: usize) -> TreeNode {
        let counts = self.class_counts(indices);
        let leaf = TreeNode::Leaf(Leaf {
            class_index: majority(&counts),
            samples: indices.len(),
        });

        let pure = counts.iter().filter(|&&c| c > 0).count() <= 1;
        if depth >= self.params.max_depth || indices.len() < self.params.min_samples_split || pure {
            return leaf;
        }

        let parent = gini(&counts, indices.len());
        let Some(best) = self.best_split(indices).filter(|b| b.impurity < parent) else {
            return leaf;
        };

        debug!(
            depth,
            feature = best.feature,
            threshold = best.threshold,
            impurity = best.impurity,
            "Split node"
        );

        let (left, right): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| self.value(i, best.feature) <= best.threshold);

        TreeNode::Split(Split {
            feature: best.feature,
            threshold: best.threshold,
            left: Box::new(self.build(&left, depth + 1)),
            right: Box::new(self.build(&right, depth + 1)),
        })
    }

    fn best_split(&self, indices: &[usize]) -> Option<BestSplit> {
        let n = indices.len() as f64;
        let mut best: Option<BestSplit> = None;

        for feature in 0..FEATURE_COUNT {
            let mut values: Vec<f64> = indices.iter().map(|&i| self.value(i, feature)).collect();
            values.sort_by(f64::total_cmp);
            values.dedup();

            for pair in values.windows(2) {
                let threshold = (pair[0] + pair[1]) / 2.0;

                let mut left = vec![0usize; self.class_count];
                let mut right = vec![0usize; self.class_count];
                for &i in indices {
                    let target = self.dataset.targets[i];
                    if self.value(i, feature) <= threshold {
                        left[target] += 1;
                    } else {
                        right[target] += 1;
                    }
                }

                let n_left: usize = left.iter().sum();
                let n_right: usize = right.iter().sum();
                let impurity = (n_left as f64 * gini(&left, n_left)
                    + n_right as f64 * gini(&right, n_right))
                    / n;

                if best.as_ref().map_or(true, |b| impurity < b.impurity) {
                    best = Some(BestSplit { impurity, feature, threshold });
                }
            }
        }

        best
    }

    fn class_counts(&self, indices: &[usize]) -> Vec<usize> {
        let mut counts = vec![0usize; self.class_count];
        for &i in indices {
            counts[self.dataset.targets[i]] += 1;
        }
        counts
    }

    fn value(&self, row: usize, feature: usize) -> f64 {
        self.dataset.features[row].as_array()[feature]
    }
}

fn gini(counts: &[usize], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let sum_sq: f64 = counts
        .iter()
        .map(|&c| {
            let p = c as f64 / total as f64;
            p * p
        })
        .fold(0.0, |acc, x| acc + x);
    1.0 - sum_sq
}

fn majority(counts: &[usize]) -> usize {
    let mut best = 0;
    for (class, &count) in counts.iter().enumerate().skip(1) {
        if count > counts[best] {
            best = class;
        }
    }
    best
}
