//! Weighted anomaly rules.
//!
//! The score is the sum of the weights of every triggered anomaly. A UPI
//! payload that passes validation resets the score to 0 and keeps only
//! UPI-specific rules: this is a business rule that trusts UPI's structured
//! format, and it hides structural evidence of tampering on such codes.
//! Set `scoring.upi_override = false` to keep that evidence.

use crate::config::{RuleWeights, ScoringConfig, StructuralConfig};
use crate::models::Confidence;
use crate::structural::StructuralAnalyzer;

use super::{Assessment, Evidence, FraudScorer};

/// Conditions the rule scorer can weigh, in reason order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Anomaly {
    SmallCode,
    AbnormalBwRatio,
    AbnormalDensity,
    LogoOcclusion,
    InsecureTransport,
    MalformedUpi,
    SuspiciousToken,
    FormHeavyPage,
}

impl Anomaly {
    pub const ALL: [Anomaly; 8] = [
        Anomaly::SmallCode,
        Anomaly::AbnormalBwRatio,
        Anomaly::AbnormalDensity,
        Anomaly::LogoOcclusion,
        Anomaly::InsecureTransport,
        Anomaly::MalformedUpi,
        Anomaly::SuspiciousToken,
        Anomaly::FormHeavyPage,
    ];

    /// Configured weight of this anomaly
    pub fn weight(self, weights: &RuleWeights) -> f64 {
        match self {
            Anomaly::SmallCode => weights.small_code,
            Anomaly::AbnormalBwRatio => weights.abnormal_bw_ratio,
            Anomaly::AbnormalDensity => weights.abnormal_density,
            Anomaly::LogoOcclusion => weights.logo_occlusion,
            Anomaly::InsecureTransport => weights.insecure_transport,
            Anomaly::MalformedUpi => weights.malformed_upi,
            Anomaly::SuspiciousToken => weights.suspicious_token,
            Anomaly::FormHeavyPage => weights.form_heavy_page,
        }
    }

    /// Survives the UPI override
    pub fn is_upi_specific(self) -> bool {
        matches!(self, Anomaly::MalformedUpi)
    }

    /// Detection that needs no configured bounds; `None` for the
    /// band checks on pixel statistics
    pub fn detect_signal(self, evidence: &Evidence) -> Option<bool> {
        let content = &evidence.content;
        match self {
            Anomaly::SmallCode | Anomaly::AbnormalBwRatio | Anomaly::AbnormalDensity => None,
            Anomaly::LogoOcclusion => Some(evidence.structure.has_logo),
            Anomaly::InsecureTransport => Some(content.insecure_transport),
            Anomaly::MalformedUpi => Some(content.malformed_upi),
            Anomaly::SuspiciousToken => Some(!content.suspicious_tokens.is_empty()),
            Anomaly::FormHeavyPage => Some(content.form_heavy),
        }
    }

    /// Full detection against the structural bounds
    pub fn detect(self, evidence: &Evidence, structural: &StructuralAnalyzer) -> bool {
        let metrics = &evidence.structure;
        match self {
            Anomaly::SmallCode => structural.is_small(metrics),
            Anomaly::AbnormalBwRatio => structural.is_bw_ratio_abnormal(metrics),
            Anomaly::AbnormalDensity => structural.is_density_abnormal(metrics),
            other => other.detect_signal(evidence).unwrap_or(false),
        }
    }

    /// Reason line for a triggered anomaly
    pub fn describe(self, evidence: &Evidence) -> String {
        let m = &evidence.structure;
        let c = &evidence.content;
        match self {
            Anomaly::SmallCode => format!(
                "QR code covers only {:.1}% of the image",
                m.relative_size * 100.0
            ),
            Anomaly::AbnormalBwRatio => {
                format!("black/white pixel ratio {:.2} outside expected range", m.bw_ratio)
            }
            Anomaly::AbnormalDensity => {
                format!("pixel density {:.2} outside expected range", m.density)
            }
            Anomaly::LogoOcclusion => {
                "center of the code is blank (possible logo overlay)".to_string()
            }
            Anomaly::InsecureTransport => "link uses unencrypted http://".to_string(),
            Anomaly::MalformedUpi => "UPI link is missing payee address or name".to_string(),
            Anomaly::SuspiciousToken => format!(
                "link contains suspicious words: {}",
                c.suspicious_tokens.join(", ")
            ),
            Anomaly::FormHeavyPage => format!(
                "linked page hosts {} forms",
                c.form_count.unwrap_or_default()
            ),
        }
    }
}

/// Map a rule score onto confidence bands
pub fn confidence_for(score: f64, high_band: f64, medium_band: f64) -> Confidence {
    if score >= high_band {
        Confidence::High
    } else if score >= medium_band {
        Confidence::Medium
    } else {
        Confidence::Low
    }
}

/// Weighted-rule scorer
#[derive(Debug, Clone)]
pub struct RuleScorer {
    rules: Vec<(Anomaly, f64)>,
    structural: StructuralAnalyzer,
    fraud_threshold: f64,
    high_band: f64,
    medium_band: f64,
    upi_override: bool,
}

impl RuleScorer {
    pub fn new(scoring: &ScoringConfig, structural: &StructuralConfig) -> Self {
        let rules = Anomaly::ALL
            .iter()
            .map(|&a| (a, a.weight(&scoring.weights)))
            .filter(|&(_, w)| w > 0.0)
            .collect();
        Self {
            rules,
            structural: StructuralAnalyzer::new(structural.clone()),
            fraud_threshold: scoring.fraud_threshold,
            high_band: scoring.high_band,
            medium_band: scoring.medium_band,
            upi_override: scoring.upi_override,
        }
    }

    /// Active rules with their weights, in evaluation order
    pub fn rules(&self) -> &[(Anomaly, f64)] {
        &self.rules
    }

    /// Anomalies that fire for `evidence`, after the UPI override
    pub fn triggered(&self, evidence: &Evidence) -> (Vec<(Anomaly, f64)>, usize) {
        let mut hits: Vec<(Anomaly, f64)> = self
            .rules
            .iter()
            .copied()
            .filter(|(a, _)| a.detect(evidence, &self.structural))
            .collect();

        let mut overridden = 0;
        if self.upi_override && evidence.content.is_valid_upi() {
            let before = hits.len();
            hits.retain(|(a, _)| a.is_upi_specific());
            overridden = before - hits.len();
        }
        (hits, overridden)
    }
}

impl FraudScorer for RuleScorer {
    fn assess(&self, evidence: &Evidence) -> Assessment {
        let (hits, overridden) = self.triggered(evidence);
        let score = hits.iter().fold(0.0, |acc, (_, w)| acc + w);

        let mut reasons: Vec<String> = hits.iter().map(|(a, _)| a.describe(evidence)).collect();
        if overridden > 0 {
            reasons.push(format!(
                "valid UPI payment link: {overridden} other signal(s) not scored"
            ));
        }

        Assessment {
            is_fraud: score >= self.fraud_threshold,
            confidence: confidence_for(score, self.high_band, self.medium_band),
            score,
            reasons,
        }
    }

    fn name(&self) -> &'static str {
        "rules"
    }
}
