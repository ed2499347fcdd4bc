//! Decision-tree classifier and its JSON artifact format.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    Classifier, FeatureVector, ModelInfo, PetalError, Prediction, FEATURE_COUNT, FEATURE_NAMES,
};

/// Artifact format version written by [`DecisionTree::save`].
pub const FORMAT_VERSION: u32 = 1;

/// Internal decision node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Split {
    /// Index of the feature to split on.
    pub feature: usize,
    /// Samples with `features[feature] <= threshold` go left.
    pub threshold: f64,
    pub left: Box<TreeNode>,
    pub right: Box<TreeNode>,
}

/// Terminal node carrying a class prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leaf {
    /// Index into the artifact's label list.
    #[serde(rename = "class")]
    pub class_index: usize,
    /// Number of training samples that reached this leaf.
    pub samples: usize,
}

/// A node in a decision tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeNode {
    Split(Split),
    Leaf(Leaf),
}

impl TreeNode {
    /// Leaves have depth 0; a split is one deeper than its deepest child.
    pub fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf(_) => 0,
            TreeNode::Split(split) => 1 + split.left.depth().max(split.right.depth()),
        }
    }

    pub fn leaf_count(&self) -> usize {
        match self {
            TreeNode::Leaf(_) => 1,
            TreeNode::Split(split) => split.left.leaf_count() + split.right.leaf_count(),
        }
    }

    fn validate(&self, label_count: usize) -> Result<(), String> {
        match self {
            TreeNode::Leaf(leaf) if leaf.class_index >= label_count => Err(format!(
                "leaf class {} out of range for {} labels",
                leaf.class_index, label_count
            )),
            TreeNode::Leaf(_) => Ok(()),
            TreeNode::Split(split) => {
                if split.feature >= FEATURE_COUNT {
                    return Err(format!(
                        "split feature {} out of range for {} features",
                        split.feature, FEATURE_COUNT
                    ));
                }
                if !split.threshold.is_finite() {
                    return Err(format!("split threshold {} is not finite", split.threshold));
                }
                split.left.validate(label_count)?;
                split.right.validate(label_count)
            }
        }
    }
}

/// A fitted classification tree, as persisted in the model artifact.
///
/// Immutable once constructed or loaded. Every leaf refers to a valid label
/// and every split to a valid feature, so [`Classifier::predict`] always
/// yields a member of [`DecisionTree::labels`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    format_version: u32,
    feature_names: Vec<String>,
    labels: Vec<String>,
    tree: TreeNode,
}

impl DecisionTree {
    /// Builds a tree over the standard feature names, validating `root`
    /// against `labels`.
    pub fn new(labels: Vec<String>, root: TreeNode) -> Result<Self, PetalError> {
        let model = Self {
            format_version: FORMAT_VERSION,
            feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            labels,
            tree: root,
        };
        model.validate().map_err(PetalError::Validation)?;
        Ok(model)
    }

    /// Loads and validates an artifact from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PetalError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| PetalError::ArtifactIo {
            path: path.to_path_buf(),
            source,
        })?;

        let model = Self::from_json(&content).map_err(|reason| PetalError::ArtifactFormat {
            path: path.to_path_buf(),
            reason,
        })?;

        info!(
            path = %path.display(),
            labels = ?model.labels,
            depth = model.depth(),
            leaves = model.tree.leaf_count(),
            "Loaded model artifact"
        );
        Ok(model)
    }

    fn from_json(content: &str) -> Result<Self, String> {
        let model: Self = serde_json::from_str(content).map_err(|e| e.to_string())?;
        model.validate()?;
        Ok(model)
    }

    /// Writes the artifact as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), PetalError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).map_err(|e| PetalError::ArtifactFormat {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let io_err = |source| PetalError::ArtifactIo {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        fs::write(path, json + "\n").map_err(io_err)?;

        debug!(path = %path.display(), "Wrote model artifact");
        Ok(())
    }

    fn validate(&self) -> Result<(), String> {
        if self.format_version != FORMAT_VERSION {
            return Err(format!(
                "unsupported format version {} (expected {})",
                self.format_version, FORMAT_VERSION
            ));
        }
        if self.feature_names.len() != FEATURE_COUNT {
            return Err(format!(
                "expected {} feature names, got {}",
                FEATURE_COUNT,
                self.feature_names.len()
            ));
        }
        if self.labels.is_empty() {
            return Err("label set is empty".into());
        }
        self.tree.validate(self.labels.len())
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn root(&self) -> &TreeNode {
        &self.tree
    }

    pub fn depth(&self) -> usize {
        self.tree.depth()
    }

    /// Class index predicted for `features`.
    pub fn predict_class(&self, features: &FeatureVector) -> Result<usize, PetalError> {
        let mut node = &self.tree;
        loop {
            match node {
                TreeNode::Leaf(leaf) => return Ok(leaf.class_index),
                TreeNode::Split(split) => {
                    let value = features.get(split.feature).ok_or_else(|| {
                        PetalError::Inference(format!("no feature at index {}", split.feature))
                    })?;
                    node = if value <= split.threshold { &split.left } else { &split.right };
                }
            }
        }
    }
}

impl Classifier for DecisionTree {
    fn predict(&self, features: &FeatureVector) -> Result<Prediction, PetalError> {
        let class = self.predict_class(features)?;
        self.labels
            .get(class)
            .map(|label| Prediction(label.clone()))
            .ok_or_else(|| PetalError::Inference(format!("class {} has no label", class)))
    }

    fn info(&self) -> ModelInfo {
        ModelInfo {
            feature_names: self.feature_names.clone(),
            labels: self.labels.clone(),
            depth: Some(self.depth()),
            leaves: Some(self.tree.leaf_count()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(class_index: usize, samples: usize) -> Box<TreeNode> {
        Box::new(TreeNode::Leaf(Leaf { class_index, samples }))
    }

    fn iris_tree() -> DecisionTree {
        DecisionTree::new(
            vec!["setosa".into(), "versicolor".into(), "virginica".into()],
            TreeNode::Split(Split {
                feature: 2,
                threshold: 2.45,
                left: leaf(0, 50),
                right: Box::new(TreeNode::Split(Split {
                    feature: 3,
                    threshold: 1.75,
                    left: leaf(1, 54),
                    right: leaf(2, 46),
                })),
            }),
        )
        .unwrap()
    }

    fn fv(values: [f64; 4]) -> FeatureVector {
        FeatureVector::new(values).unwrap()
    }

    #[test]
    fn test_predict_routes_on_threshold() {
        let tree = iris_tree();
        assert_eq!(tree.predict(&fv([5.1, 3.5, 1.4, 0.2])).unwrap().label(), "setosa");
        assert_eq!(tree.predict(&fv([6.4, 3.2, 4.5, 1.5])).unwrap().label(), "versicolor");
        assert_eq!(tree.predict(&fv([6.7, 3.0, 5.2, 2.3])).unwrap().label(), "virginica");

        // Equal to the threshold goes left.
        assert_eq!(tree.predict(&fv([0.0, 0.0, 2.45, 9.0])).unwrap().label(), "setosa");
    }

    #[test]
    fn test_predict_is_deterministic_and_total() {
        let tree = iris_tree();
        let extremes = [
            [0.0, 0.0, 0.0, 0.0],
            [-1e300, 1e300, -1e300, 1e300],
            [f64::MAX, f64::MIN, f64::MAX, f64::MIN],
        ];
        for values in extremes {
            let first = tree.predict(&fv(values)).unwrap();
            let second = tree.predict(&fv(values)).unwrap();
            assert_eq!(first, second);
            assert!(tree.labels().contains(&first.label().to_string()));
        }
    }

    #[test]
    fn test_new_rejects_out_of_range_class() {
        let err = DecisionTree::new(vec!["only".into()], *leaf(1, 3)).unwrap_err();
        assert!(err.to_string().contains("leaf class 1 out of range"));
    }

    #[test]
    fn test_new_rejects_bad_split() {
        let bad_feature = TreeNode::Split(Split {
            feature: 4,
            threshold: 1.0,
            left: leaf(0, 1),
            right: leaf(0, 1),
        });
        assert!(DecisionTree::new(vec!["a".into()], bad_feature).is_err());

        let bad_threshold = TreeNode::Split(Split {
            feature: 0,
            threshold: f64::NAN,
            left: leaf(0, 1),
            right: leaf(0, 1),
        });
        assert!(DecisionTree::new(vec!["a".into()], bad_threshold).is_err());

        assert!(DecisionTree::new(vec![], *leaf(0, 1)).is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("model.json");

        let tree = iris_tree();
        tree.save(&path).unwrap();
        let loaded = DecisionTree::load(&path).unwrap();

        assert_eq!(loaded, tree);
        assert_eq!(loaded.depth(), 2);
        assert_eq!(loaded.info().leaves, Some(3));
    }

    #[test]
    fn test_artifact_json_layout() {
        let json = serde_json::to_value(iris_tree()).unwrap();
        assert_eq!(json["format_version"], 1);
        assert_eq!(json["tree"]["split"]["feature"], 2);
        assert_eq!(json["tree"]["split"]["left"]["leaf"]["class"], 0);
        assert_eq!(json["tree"]["split"]["left"]["leaf"]["samples"], 50);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = DecisionTree::load(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, PetalError::ArtifactIo { .. }));
    }

    #[test]
    fn test_load_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");

        fs::write(&path, "not json").unwrap();
        assert!(matches!(
            DecisionTree::load(&path).unwrap_err(),
            PetalError::ArtifactFormat { .. }
        ));

        let wrong_version = serde_json::json!({
            "format_version": 7,
            "feature_names": FEATURE_NAMES,
            "labels": ["a"],
            "tree": { "leaf": { "class": 0, "samples": 1 } }
        });
        fs::write(&path, wrong_version.to_string()).unwrap();
        let err = DecisionTree::load(&path).unwrap_err();
        assert!(err.to_string().contains("unsupported format version 7"));

        let dangling_class = serde_json::json!({
            "format_version": 1,
            "feature_names": FEATURE_NAMES,
            "labels": ["a", "b"],
            "tree": { "leaf": { "class": 2, "samples": 1 } }
        });
        fs::write(&path, dangling_class.to_string()).unwrap();
        assert!(matches!(
            DecisionTree::load(&path).unwrap_err(),
            PetalError::ArtifactFormat { .. }
        ));
    }

    #[test]
    fn test_load_bundled_artifact() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../model/iris_model.json");
        let model = DecisionTree::load(path).unwrap();

        assert_eq!(model.labels(), ["setosa", "versicolor", "virginica"]);
        assert_eq!(model.predict(&fv([5.1, 3.5, 1.4, 0.2])).unwrap().label(), "setosa");
        assert_eq!(model.predict(&fv([6.7, 3.0, 5.2, 2.3])).unwrap().label(), "virginica");
    }
}
