use std::fs;
use std::path::Path;

use log::info;
use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::artifact_store::ArtifactKind;
use crate::pipeline::PipelineError;

/// A node of a serialized decision tree.
///
/// Trees use the flat-array layout the training exporter produces: children
/// are indices into the node list and always point forward, so traversal is
/// guaranteed to terminate once the structure has been validated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        class: usize,
    },
}

/// One tree of the trained forest. Split semantics follow the exporter:
/// `value <= threshold` descends left, otherwise right.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    fn validate(&self, n_features: usize, n_classes: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        for (index, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split { feature, left, right, threshold } => {
                    if *feature >= n_features {
                        return Err(format!(
                            "node {} references feature {} but the model has {} features",
                            index, feature, n_features
                        ));
                    }
                    if !threshold.is_finite() {
                        return Err(format!("node {} has non-finite threshold", index));
                    }
                    if *left >= self.nodes.len() || *right >= self.nodes.len() {
                        return Err(format!("node {} has out-of-range child index", index));
                    }
                    if *left <= index || *right <= index {
                        return Err(format!(
                            "node {} has a backward child reference",
                            index
                        ));
                    }
                }
                TreeNode::Leaf { class } => {
                    if *class >= n_classes {
                        return Err(format!(
                            "leaf {} predicts class {} but the model has {} classes",
                            index, class, n_classes
                        ));
                    }
                }
            }
        }
        Ok(())
    }

    /// Walks the tree for one sample. The structure is validated at load
    /// time, so traversal cannot go out of bounds or loop.
    fn predict(&self, features: &Array1<f64>) -> usize {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                TreeNode::Split { feature, threshold, left, right } => {
                    index = if features[*feature] <= *threshold { *left } else { *right };
                }
                TreeNode::Leaf { class } => return *class,
            }
        }
    }
}

/// The trained classifier: a majority-vote forest of decision trees, loaded
/// from the model artifact and immutable thereafter.
///
/// Prediction is a pure function of the numeric input; re-invoking with an
/// identical vector yields an identical class code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    n_features: usize,
    n_classes: usize,
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    /// Builds a forest from parts, validating the structure the way `load`
    /// does.
    pub fn new(
        n_features: usize,
        n_classes: usize,
        trees: Vec<DecisionTree>,
    ) -> Result<Self, PipelineError> {
        let forest = Self { n_features, n_classes, trees };
        forest.validate()?;
        Ok(forest)
    }

    /// Loads and validates `model.json` inside `dir`. Malformed model
    /// artifacts are startup-fatal.
    pub fn load(dir: &Path) -> Result<Self, PipelineError> {
        let path = dir.join(ArtifactKind::Model.file_name());
        let raw = fs::read_to_string(&path).map_err(|e| {
            PipelineError::SchemaLoad(format!("failed to read {:?}: {}", path, e))
        })?;
        let forest: RandomForest = serde_json::from_str(&raw)?;
        forest.validate()?;
        info!(
            "Model loaded from {:?}: {} trees, {} features, {} classes",
            path,
            forest.trees.len(),
            forest.n_features,
            forest.n_classes
        );
        Ok(forest)
    }

    fn validate(&self) -> Result<(), PipelineError> {
        if self.n_features == 0 {
            return Err(PipelineError::SchemaLoad(
                "model declares zero features".to_string(),
            ));
        }
        if self.n_classes == 0 {
            return Err(PipelineError::SchemaLoad(
                "model declares zero classes".to_string(),
            ));
        }
        if self.trees.is_empty() {
            return Err(PipelineError::SchemaLoad(
                "model contains no trees".to_string(),
            ));
        }
        for (index, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features, self.n_classes).map_err(|e| {
                PipelineError::SchemaLoad(format!("tree {}: {}", index, e))
            })?;
        }
        Ok(())
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    /// Predicts the class code for a single sample by majority vote across
    /// the trees. Vote ties resolve to the smallest class code.
    pub fn predict(&self, features: &Array1<f64>) -> Result<usize, PipelineError> {
        if features.len() != self.n_features {
            return Err(PipelineError::Inference(format!(
                "model expects {} features, got {}",
                self.n_features,
                features.len()
            )));
        }
        let mut votes = vec![0usize; self.n_classes];
        for tree in &self.trees {
            votes[tree.predict(features)] += 1;
        }
        let mut best = 0;
        for (class, &count) in votes.iter().enumerate() {
            if count > votes[best] {
                best = class;
            }
        }
        Ok(best)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn leaf_tree(class: usize) -> DecisionTree {
        DecisionTree { nodes: vec![TreeNode::Leaf { class }] }
    }

    fn split_tree() -> DecisionTree {
        DecisionTree {
            nodes: vec![
                TreeNode::Split { feature: 0, threshold: 0.0, left: 1, right: 2 },
                TreeNode::Leaf { class: 0 },
                TreeNode::Leaf { class: 1 },
            ],
        }
    }

    #[test]
    fn test_split_semantics() {
        let forest = RandomForest::new(1, 2, vec![split_tree()]).unwrap();
        assert_eq!(forest.predict(&array![-1.0]).unwrap(), 0);
        assert_eq!(forest.predict(&array![0.0]).unwrap(), 0);
        assert_eq!(forest.predict(&array![0.5]).unwrap(), 1);
    }

    #[test]
    fn test_majority_vote() {
        let forest =
            RandomForest::new(1, 3, vec![leaf_tree(2), leaf_tree(2), leaf_tree(1)]).unwrap();
        assert_eq!(forest.predict(&array![0.0]).unwrap(), 2);
    }

    #[test]
    fn test_vote_tie_resolves_to_smallest_class() {
        let forest = RandomForest::new(1, 3, vec![leaf_tree(2), leaf_tree(1)]).unwrap();
        assert_eq!(forest.predict(&array![0.0]).unwrap(), 1);
    }

    #[test]
    fn test_predict_is_deterministic() {
        let forest = RandomForest::new(1, 2, vec![split_tree()]).unwrap();
        let first = forest.predict(&array![0.25]).unwrap();
        for _ in 0..10 {
            assert_eq!(forest.predict(&array![0.25]).unwrap(), first);
        }
    }

    #[test]
    fn test_rejects_dimension_mismatch() {
        let forest = RandomForest::new(2, 2, vec![leaf_tree(0)]).unwrap();
        let result = forest.predict(&array![1.0]);
        assert!(matches!(result, Err(PipelineError::Inference(_))));
    }

    #[test]
    fn test_rejects_out_of_range_feature() {
        let tree = DecisionTree {
            nodes: vec![
                TreeNode::Split { feature: 5, threshold: 0.0, left: 1, right: 2 },
                TreeNode::Leaf { class: 0 },
                TreeNode::Leaf { class: 0 },
            ],
        };
        let result = RandomForest::new(1, 2, vec![tree]);
        assert!(matches!(result, Err(PipelineError::SchemaLoad(_))));
    }

    #[test]
    fn test_rejects_backward_child_reference() {
        let tree = DecisionTree {
            nodes: vec![
                TreeNode::Split { feature: 0, threshold: 0.0, left: 0, right: 1 },
                TreeNode::Leaf { class: 0 },
            ],
        };
        let result = RandomForest::new(1, 2, vec![tree]);
        assert!(matches!(result, Err(PipelineError::SchemaLoad(_))));
    }

    #[test]
    fn test_rejects_out_of_range_leaf_class() {
        let result = RandomForest::new(1, 2, vec![leaf_tree(7)]);
        assert!(matches!(result, Err(PipelineError::SchemaLoad(_))));
    }

    #[test]
    fn test_rejects_empty_forest() {
        let result = RandomForest::new(1, 2, vec![]);
        assert!(matches!(result, Err(PipelineError::SchemaLoad(_))));
    }

    #[test]
    fn test_json_round_trip() {
        let forest = RandomForest::new(1, 2, vec![split_tree()]).unwrap();
        let json = serde_json::to_string(&forest).unwrap();
        let back: RandomForest = serde_json::from_str(&json).unwrap();
        assert_eq!(back.n_features(), 1);
        assert_eq!(back.predict(&array![1.0]).unwrap(), 1);
    }
}
