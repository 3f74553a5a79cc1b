//! Random forest of binary decision trees exported as JSON node lists.
//!
//! Splits go left when `x[feature] <= threshold`. Leaves carry per-class weights
//! (counts or fractions). The forest probability is the mean of each tree's
//! normalized leaf distribution.

use super::Classifier;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: [f64; 2],
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

impl Tree {
    fn validate(&self, n_features: usize) -> std::result::Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".into());
        }
        let len = self.nodes.len();
        for (id, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= n_features {
                        return Err(format!(
                            "node {} splits on feature {} of {}",
                            id, feature, n_features
                        ));
                    }
                    if threshold.is_nan() {
                        return Err(format!("node {} has a NaN threshold", id));
                    }
                    // children after their parent: traversal always terminates
                    for child in [*left, *right] {
                        if child <= id || child >= len {
                            return Err(format!("node {} has invalid child {}", id, child));
                        }
                    }
                }
                Node::Leaf { value } => {
                    if value.iter().any(|v| !v.is_finite() || *v < 0.0) {
                        return Err(format!("leaf {} has invalid class weights", id));
                    }
                    if value[0] + value[1] <= 0.0 {
                        return Err(format!("leaf {} has no class weight", id));
                    }
                }
            }
        }
        Ok(())
    }

    fn leaf(&self, features: &[f64]) -> [f64; 2] {
        let mut id = 0;
        loop {
            match &self.nodes[id] {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    // fitted trees compare single-precision inputs
                    let x = features[*feature] as f32 as f64;
                    id = if x <= *threshold { *left } else { *right };
                }
                Node::Leaf { value } => return *value,
            }
        }
    }

    pub fn predict_proba(&self, features: &[f64]) -> [f64; 2] {
        let [c0, c1] = self.leaf(features);
        let total = c0 + c1;
        [c0 / total, c1 / total]
    }
}

#[derive(Debug, Clone)]
pub struct ForestClassifier {
    n_features: usize,
    trees: Vec<Tree>,
}

impl ForestClassifier {
    pub fn new(n_features: usize, trees: Vec<Tree>) -> std::result::Result<Self, String> {
        if trees.is_empty() {
            return Err("random forest has no trees".into());
        }
        for (i, tree) in trees.iter().enumerate() {
            tree.validate(n_features)
                .map_err(|e| format!("tree {}: {}", i, e))?;
        }
        Ok(Self { n_features, trees })
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

impl Classifier for ForestClassifier {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_proba(&self, features: &[f64]) -> Result<[f64; 2]> {
        if features.len() != self.n_features {
            return Err(Error::Inference(format!(
                "forest expects {} features, got {}",
                self.n_features,
                features.len()
            )));
        }
        let mut sum = [0.0f64; 2];
        for tree in &self.trees {
            let p = tree.predict_proba(features);
            sum[0] += p[0];
            sum[1] += p[1];
        }
        let n = self.trees.len() as f64;
        Ok([sum[0] / n, sum[1] / n])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump(feature: usize, threshold: f64, left: [f64; 2], right: [f64; 2]) -> Tree {
        Tree {
            nodes: vec![
                Node::Split {
                    feature,
                    threshold,
                    left: 1,
                    right: 2,
                },
                Node::Leaf { value: left },
                Node::Leaf { value: right },
            ],
        }
    }

    #[test]
    fn averages_normalized_leaves() {
        let forest = ForestClassifier::new(
            2,
            vec![
                stump(0, 0.5, [8.0, 2.0], [1.0, 3.0]),
                stump(1, 0.0, [0.5, 0.5], [0.0, 1.0]),
            ],
        )
        .unwrap();

        // tree0 left -> 0.2, tree1 right -> 1.0
        let p = forest.predict_proba(&[0.0, 1.0]).unwrap();
        assert!((p[1] - 0.6).abs() < 1e-12);
        assert!((p[0] + p[1] - 1.0).abs() < 1e-12);
        assert_eq!(forest.predict(&[0.0, 1.0]).unwrap(), 1);

        // tree0 left -> 0.2, tree1 left -> 0.5
        let p = forest.predict_proba(&[0.5, 0.0]).unwrap();
        assert!((p[1] - 0.35).abs() < 1e-12);
        assert_eq!(forest.predict(&[0.5, 0.0]).unwrap(), 0);
    }

    #[test]
    fn rejects_backward_edges_and_bad_features() {
        let cyclic = Tree {
            nodes: vec![Node::Split {
                feature: 0,
                threshold: 0.0,
                left: 0,
                right: 0,
            }],
        };
        assert!(ForestClassifier::new(1, vec![cyclic]).is_err());

        let out_of_range = stump(3, 0.0, [1.0, 0.0], [0.0, 1.0]);
        assert!(ForestClassifier::new(2, vec![out_of_range]).is_err());

        let empty_leaf = stump(0, 0.0, [0.0, 0.0], [0.0, 1.0]);
        assert!(ForestClassifier::new(1, vec![empty_leaf]).is_err());
    }

    #[test]
    fn wrong_width_is_an_inference_error() {
        let forest = ForestClassifier::new(2, vec![stump(0, 0.0, [1.0, 0.0], [0.0, 1.0])]).unwrap();
        assert!(matches!(
            forest.predict_proba(&[1.0]),
            Err(Error::Inference(_))
        ));
    }

    #[test]
    fn parses_tagged_nodes() {
        let tree: Tree = serde_json::from_str(
            r#"{"nodes":[
                {"type":"split","feature":0,"threshold":1.5,"left":1,"right":2},
                {"type":"leaf","value":[3,1]},
                {"type":"leaf","value":[0,4]}
            ]}"#,
        )
        .unwrap();
        assert_eq!(tree.predict_proba(&[2.0]), [0.0, 1.0]);
        assert_eq!(tree.predict_proba(&[1.5]), [0.75, 0.25]);
    }
}
