//! Turning extracted features into a fraud decision.
//!
//! Two interchangeable strategies implement [`FraudScorer`]: the weighted
//! anomaly rules in [`rules`] and the trained forest in [`model`]. Both see
//! the same [`Evidence`] and return the same [`Assessment`] shape.

pub mod forest;
pub mod model;
pub mod rules;

use crate::models::{Confidence, ContentSignals, FeatureVector, StructuralMetrics};

pub use forest::{ForestModel, ModelError};
pub use model::ModelScorer;
pub use rules::{Anomaly, RuleScorer};

/// Everything known about a readable code
#[derive(Debug, Clone, PartialEq)]
pub struct Evidence {
    pub structure: StructuralMetrics,
    pub content: ContentSignals,
    pub features: FeatureVector,
}

impl Evidence {
    pub fn new(structure: StructuralMetrics, content: ContentSignals) -> Self {
        let features = FeatureVector::from_parts(&content, &structure);
        Self {
            structure,
            content,
            features,
        }
    }
}

/// Scorer output, before it is packaged as a verdict
#[derive(Debug, Clone, PartialEq)]
pub struct Assessment {
    pub is_fraud: bool,
    pub confidence: Confidence,
    /// Rule score, or fraud probability for the model strategy
    pub score: f64,
    pub reasons: Vec<String>,
}

/// A fraud decision strategy.
///
/// Implementations are shared across threads and must not mutate state
/// while assessing.
pub trait FraudScorer: Send + Sync {
    fn assess(&self, evidence: &Evidence) -> Assessment;

    /// Short name for logs
    fn name(&self) -> &'static str;
}
