//! Random-forest artifact.
//!
//! Trees are trained offline on the dataset written by
//! [`crate::tools::write_dataset_csv`] and exported as JSON:
//!
//! ```json
//! {
//!   "feature_names": ["is_https", "domain_length", "has_suspicious_words", "is_upi", "has_logo"],
//!   "trees": [
//!     { "nodes": [
//!       { "split": { "feature": 2, "threshold": 0.5, "left": 1, "right": 2 } },
//!       { "leaf": { "fraud_probability": 0.05 } },
//!       { "leaf": { "fraud_probability": 0.95 } }
//!     ] }
//!   ]
//! }
//! ```
//!
//! Samples go left when `x[feature] <= threshold`. Node 0 is the root and
//! children always sit after their parent, so every walk terminates.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::models::features::FEATURE_NAMES;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("IO error reading model: {0}")]
    Io(#[from] std::io::Error),
    #[error("model JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid model: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        fraud_probability: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

impl Tree {
    fn validate(&self, index: usize) -> Result<(), ModelError> {
        let invalid = |msg: String| Err(ModelError::Invalid(format!("tree {index}: {msg}")));
        if self.nodes.is_empty() {
            return invalid("no nodes".into());
        }
        for (i, node) in self.nodes.iter().enumerate() {
            match *node {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if feature >= FEATURE_NAMES.len() {
                        return invalid(format!("node {i} splits on unknown feature {feature}"));
                    }
                    if !threshold.is_finite() {
                        return invalid(format!("node {i} has a non-finite threshold"));
                    }
                    for child in [left, right] {
                        if child <= i || child >= self.nodes.len() {
                            return invalid(format!("node {i} has bad child index {child}"));
                        }
                    }
                }
                Node::Leaf { fraud_probability } => {
                    if !(0.0..=1.0).contains(&fraud_probability) {
                        return invalid(format!("node {i} probability outside [0, 1]"));
                    }
                }
            }
        }
        Ok(())
    }

    /// Leaf probability reached by `x`
    pub fn predict(&self, x: &[f64; 5]) -> f64 {
        let mut i = 0;
        loop {
            match self.nodes[i] {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => i = if x[feature] <= threshold { left } else { right },
                Node::Leaf { fraud_probability } => return fraud_probability,
            }
        }
    }
}

/// Validated forest, immutable once loaded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestModel {
    pub feature_names: Vec<String>,
    pub trees: Vec<Tree>,
}

impl ForestModel {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ModelError> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ModelError> {
        let model: ForestModel = serde_json::from_str(json)?;
        model.validate()?;
        Ok(model)
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.feature_names != FEATURE_NAMES {
            return Err(ModelError::Invalid(format!(
                "feature names {:?} do not match {:?}",
                self.feature_names, FEATURE_NAMES
            )));
        }
        if self.trees.is_empty() {
            return Err(ModelError::Invalid("forest has no trees".into()));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(i)?;
        }
        Ok(())
    }

    /// Mean fraud probability over all trees
    pub fn predict_proba(&self, x: &[f64; 5]) -> f64 {
        let sum: f64 = self.trees.iter().map(|t| t.predict(x)).sum();
        sum / self.trees.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAMES: &str =
        r#"["is_https", "domain_length", "has_suspicious_words", "is_upi", "has_logo"]"#;

    fn forest(trees: &str) -> String {
        format!(r#"{{"feature_names": {NAMES}, "trees": {trees}}}"#)
    }

    const STUMP: &str = r#"{"nodes": [
        {"split": {"feature": 2, "threshold": 0.5, "left": 1, "right": 2}},
        {"leaf": {"fraud_probability": 0.1}},
        {"leaf": {"fraud_probability": 0.9}}
    ]}"#;

    #[test]
    fn test_single_stump() {
        let m = ForestModel::from_json_str(&forest(&format!("[{STUMP}]"))).unwrap();
        assert_eq!(m.predict_proba(&[1.0, 11.0, 0.0, 0.0, 0.0]), 0.1);
        assert_eq!(m.predict_proba(&[1.0, 11.0, 1.0, 0.0, 0.0]), 0.9);
    }

    #[test]
    fn test_average_over_trees() {
        let constant = r#"{"nodes": [{"leaf": {"fraud_probability": 0.3}}]}"#;
        let m = ForestModel::from_json_str(&forest(&format!("[{STUMP}, {constant}]"))).unwrap();
        let p = m.predict_proba(&[0.0, 0.0, 1.0, 0.0, 0.0]);
        assert!((p - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_threshold_goes_left_on_equal() {
        let m = ForestModel::from_json_str(&forest(&format!("[{STUMP}]"))).unwrap();
        assert_eq!(m.predict_proba(&[0.0, 0.0, 0.5, 0.0, 0.0]), 0.1);
    }

    #[test]
    fn test_wrong_feature_names() {
        let json = r#"{"feature_names": ["a"], "trees": [{"nodes": [{"leaf": {"fraud_probability": 0.5}}]}]}"#;
        assert!(matches!(
            ForestModel::from_json_str(json),
            Err(ModelError::Invalid(_))
        ));
    }

    #[test]
    fn test_rejects_cycles_and_bad_indices() {
        let back_edge = r#"[{"nodes": [
            {"split": {"feature": 0, "threshold": 0.5, "left": 0, "right": 1}},
            {"leaf": {"fraud_probability": 0.5}}
        ]}]"#;
        assert!(ForestModel::from_json_str(&forest(back_edge)).is_err());

        let dangling = r#"[{"nodes": [
            {"split": {"feature": 0, "threshold": 0.5, "left": 1, "right": 7}},
            {"leaf": {"fraud_probability": 0.5}}
        ]}]"#;
        assert!(ForestModel::from_json_str(&forest(dangling)).is_err());

        let bad_feature = r#"[{"nodes": [
            {"split": {"feature": 9, "threshold": 0.5, "left": 1, "right": 2}},
            {"leaf": {"fraud_probability": 0.5}},
            {"leaf": {"fraud_probability": 0.5}}
        ]}]"#;
        assert!(ForestModel::from_json_str(&forest(bad_feature)).is_err());
    }

    #[test]
    fn test_rejects_empty_and_bad_probability() {
        assert!(ForestModel::from_json_str(&forest("[]")).is_err());
        assert!(ForestModel::from_json_str(&forest(r#"[{"nodes": []}]"#)).is_err());
        let p = r#"[{"nodes": [{"leaf": {"fraud_probability": 1.5}}]}]"#;
        assert!(ForestModel::from_json_str(&forest(p)).is_err());
    }

    #[test]
    fn test_load_errors() {
        assert!(matches!(
            ForestModel::load("/nonexistent/model.json"),
            Err(ModelError::Io(_))
        ));
        assert!(matches!(
            ForestModel::from_json_str("not json"),
            Err(ModelError::Json(_))
        ));
    }
}
