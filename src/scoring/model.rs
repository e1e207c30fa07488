use std::sync::Arc;

use crate::models::Confidence;

use super::forest::ForestModel;
use super::rules::Anomaly;
use super::{Assessment, Evidence, FraudScorer};

/// Scorer backed by a loaded forest
#[derive(Debug, Clone)]
pub struct ModelScorer {
    forest: Arc<ForestModel>,
}

impl ModelScorer {
    pub fn new(forest: ForestModel) -> Self {
        Self {
            forest: Arc::new(forest),
        }
    }
}

impl FraudScorer for ModelScorer {
    fn assess(&self, evidence: &Evidence) -> Assessment {
        let probability = self.forest.predict_proba(&evidence.features.to_array());
        let is_fraud = probability >= 0.5;

        // The forest only sees the five features, so only their signals explain it
        let mut reasons: Vec<String> = Anomaly::ALL
            .iter()
            .filter(|a| a.detect_signal(evidence).unwrap_or(false))
            .map(|a| a.describe(evidence))
            .collect();
        reasons.push(format!(
            "classifier fraud probability {probability:.2}"
        ));

        Assessment {
            is_fraud,
            confidence: if is_fraud {
                Confidence::High
            } else {
                Confidence::Low
            },
            score: probability,
            reasons,
        }
    }

    fn name(&self) -> &'static str {
        "model"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContentSignals, ContentType, StructuralMetrics};

    fn stump() -> ForestModel {
        ForestModel::from_json_str(
            r#"{
                "feature_names": ["is_https", "domain_length", "has_suspicious_words", "is_upi", "has_logo"],
                "trees": [{"nodes": [
                    {"split": {"feature": 2, "threshold": 0.5, "left": 1, "right": 2}},
                    {"leaf": {"fraud_probability": 0.2}},
                    {"leaf": {"fraud_probability": 0.8}}
                ]}]
            }"#,
        )
        .unwrap()
    }

    fn metrics() -> StructuralMetrics {
        StructuralMetrics {
            relative_size: 0.5,
            bw_ratio: 0.5,
            density: 0.3,
            has_logo: false,
            center_black_ratio: 0.5,
            black_pixels: 30,
            white_pixels: 70,
            has_geometry: true,
        }
    }

    #[test]
    fn test_fraud_is_high_confidence() {
        let content = ContentSignals {
            content_type: ContentType::HttpUrl,
            insecure_transport: true,
            ..ContentSignals::text()
        };
        let a = ModelScorer::new(stump()).assess(&Evidence::new(metrics(), content));
        assert!(a.is_fraud);
        assert_eq!(a.confidence, Confidence::High);
        assert_eq!(a.score, 0.8);
        assert_eq!(a.reasons[0], "link uses unencrypted http://");
        assert_eq!(a.reasons.last().unwrap(), "classifier fraud probability 0.80");
    }

    #[test]
    fn test_safe_is_low_confidence() {
        let a = ModelScorer::new(stump()).assess(&Evidence::new(metrics(), ContentSignals::text()));
        assert!(!a.is_fraud);
        assert_eq!(a.confidence, Confidence::Low);
        assert_eq!(a.score, 0.2);
        assert_eq!(a.reasons, vec!["classifier fraud probability 0.20"]);
    }

    #[test]
    fn test_structural_bands_not_reported() {
        let tampered = StructuralMetrics {
            relative_size: 0.001,
            density: 0.99,
            ..metrics()
        };
        let a = ModelScorer::new(stump()).assess(&Evidence::new(tampered, ContentSignals::text()));
        assert_eq!(a.reasons.len(), 1);
    }
}
