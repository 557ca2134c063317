//! Gradient-boosted tree ensemble for multi-class prediction.
//!
//! Each boosting round contributes one regression tree per class. A class's
//! margin is the base score plus the leaf values of its trees, and the
//! margins go through a softmax to give class probabilities.

use ndarray::{Array1, Axis};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::model::layers::softmax;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum Node {
    /// Go left when `x[feature] < threshold`; a NaN follows `default_left`.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
        default_left: bool,
    },
    Leaf {
        value: f64,
    },
}

/// Nodes in breadth-first order, root at index 0.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RegressionTree {
    pub nodes: Vec<Node>,
}

impl RegressionTree {
    pub fn leaf(value: f64) -> Self {
        RegressionTree {
            nodes: vec![Node::Leaf { value }],
        }
    }

    /// Children must come after their parent, which also rules out cycles.
    fn validate(&self, n_features: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("empty tree".to_string());
        }
        for (i, node) in self.nodes.iter().enumerate() {
            match *node {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    if feature >= n_features {
                        return Err(format!("node {} splits on feature {} of {}", i, feature, n_features));
                    }
                    if threshold.is_nan() {
                        return Err(format!("node {} has a NaN threshold", i));
                    }
                    for child in [left, right] {
                        if child <= i || child >= self.nodes.len() {
                            return Err(format!("node {} points at invalid child {}", i, child));
                        }
                    }
                }
                Node::Leaf { value } => {
                    if !value.is_finite() {
                        return Err(format!("leaf {} is not finite", i));
                    }
                }
            }
        }
        Ok(())
    }

    /// Walks from the root to a leaf. `tree` is only used for error reporting.
    fn evaluate(&self, x: &[f64], tree: usize) -> Result<f64, ModelError> {
        let mut index = 0;
        // a validated tree reaches a leaf in at most nodes.len() steps
        for _ in 0..=self.nodes.len() {
            match self.nodes.get(index) {
                Some(Node::Leaf { value }) => return Ok(*value),
                Some(Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    default_left,
                }) => {
                    let value = *x.get(*feature).ok_or(ModelError::BrokenTree { tree, node: index })?;
                    let go_left = if value.is_nan() { *default_left } else { value < *threshold };
                    index = if go_left { *left } else { *right };
                }
                None => break,
            }
        }
        Err(ModelError::BrokenTree { tree, node: index })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GradientBoostedTrees {
    pub n_features: usize,
    pub n_classes: usize,
    pub base_score: f64,
    pub trees: Vec<RegressionTree>,
    /// Class each tree contributes to, parallel to `trees`.
    pub tree_class: Vec<usize>,
}

impl GradientBoostedTrees {
    pub fn validate(&self) -> Result<(), String> {
        if self.n_classes < 2 {
            return Err(format!("ensemble declares {} classes", self.n_classes));
        }
        if self.trees.len() != self.tree_class.len() {
            return Err(format!(
                "{} trees but {} class assignments",
                self.trees.len(),
                self.tree_class.len()
            ));
        }
        if !self.base_score.is_finite() {
            return Err("base score is not finite".to_string());
        }
        for (i, (tree, &class)) in self.trees.iter().zip(&self.tree_class).enumerate() {
            if class >= self.n_classes {
                return Err(format!("tree {} assigned to class {} of {}", i, class, self.n_classes));
            }
            tree.validate(self.n_features).map_err(|e| format!("tree {}: {}", i, e))?;
        }
        Ok(())
    }

    /// Raw per-class scores before the softmax.
    pub fn margins(&self, x: &[f64]) -> Result<Vec<f64>, ModelError> {
        if x.len() != self.n_features {
            return Err(ModelError::ShapeMismatch {
                expected: self.n_features,
                found: x.len(),
            });
        }
        let mut margins = vec![self.base_score; self.n_classes];
        for (i, (tree, &class)) in self.trees.iter().zip(&self.tree_class).enumerate() {
            let slot = margins.get_mut(class).ok_or(ModelError::BrokenTree { tree: i, node: 0 })?;
            *slot += tree.evaluate(x, i)?;
        }
        Ok(margins)
    }

    pub fn predict_proba(&self, x: &[f64]) -> Result<Vec<f64>, ModelError> {
        let margins = self.margins(x)?;
        let row = Array1::from(margins).insert_axis(Axis(0));
        Ok(softmax(&row).row(0).to_vec())
    }
}
