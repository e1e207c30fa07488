//! End-to-end analysis: image bytes in, verdict out.
//!
//! ```text
//! bytes -> Raster -> QrReader -> (payload, geometry)
//!                                  |-> StructuralAnalyzer -> StructuralMetrics
//!                                  '-> ContentClassifier  -> ContentSignals
//!                                        -> Evidence -> FraudScorer -> Verdict
//! ```
//!
//! Every call is independent. The analyzer holds only immutable
//! configuration and shared read-only components, so one instance can
//! serve any number of threads.

use std::sync::Arc;
use std::time::Duration;

use crate::config::{ScoringStrategy, SentryConfig};
use crate::content::ContentClassifier;
use crate::content::enrich::{HttpFormInspector, LinkInspector};
use crate::decoder::{DecodeOutcome, QrReader, RqrrReader};
use crate::error::Result;
use crate::models::{
    FeatureVector, QrGeometry, Raster, StructuralMetrics, UnreadableCause, Verdict,
    truncate_payload,
};
use crate::scoring::{Evidence, ForestModel, FraudScorer, ModelScorer, RuleScorer};
use crate::structural::StructuralAnalyzer;

/// Intermediate result of one analysis, before scoring
#[derive(Debug, Clone, PartialEq)]
pub enum Inspection {
    /// Nothing to score
    Unreadable {
        cause: UnreadableCause,
        metrics: Option<StructuralMetrics>,
    },
    /// A payload was read
    Readable { payload: String, evidence: Evidence },
}

/// Thread-safe fraud analyzer
#[derive(Clone)]
pub struct Analyzer {
    reader: Arc<dyn QrReader>,
    structural: StructuralAnalyzer,
    content: ContentClassifier,
    scorer: Arc<dyn FraudScorer>,
    max_dimension: Option<u32>,
    max_decoded_chars: usize,
}

impl std::fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyzer")
            .field("structural", &self.structural)
            .field("content", &self.content)
            .field("scorer", &self.scorer.name())
            .field("max_dimension", &self.max_dimension)
            .field("max_decoded_chars", &self.max_decoded_chars)
            .finish_non_exhaustive()
    }
}

impl Analyzer {
    /// Build the production analyzer.
    ///
    /// With `scoring.strategy = "model"` the forest is loaded here; a missing
    /// or invalid artifact is an error rather than a silent rule fallback.
    pub fn from_config(config: &SentryConfig) -> Result<Self> {
        config.validate()?;

        let scorer: Arc<dyn FraudScorer> = match config.scoring.strategy {
            ScoringStrategy::Rules => {
                Arc::new(RuleScorer::new(&config.scoring, &config.structural))
            }
            ScoringStrategy::Model => {
                let path = &config.scoring.model_path;
                let forest = ForestModel::load(path)?;
                tracing::info!(
                    path = %path.display(),
                    trees = forest.trees.len(),
                    "loaded classifier model"
                );
                Arc::new(ModelScorer::new(forest))
            }
        };

        let mut content = ContentClassifier::new(&config.content);
        if config.enrichment.enabled {
            let timeout = Duration::from_millis(config.enrichment.timeout_ms);
            content = content.with_inspector(
                Arc::new(HttpFormInspector::new(timeout)),
                config.enrichment.form_count_threshold,
            );
        }

        Ok(Self {
            reader: Arc::new(RqrrReader::new()),
            structural: StructuralAnalyzer::new(config.structural.clone()),
            content,
            scorer,
            max_dimension: config.input.max_dimension(),
            max_decoded_chars: config.output.max_decoded_chars,
        })
    }

    /// Replace the QR reader
    pub fn with_reader(mut self, reader: Arc<dyn QrReader>) -> Self {
        self.reader = reader;
        self
    }

    /// Replace the scoring strategy
    pub fn with_scorer(mut self, scorer: Arc<dyn FraudScorer>) -> Self {
        self.scorer = scorer;
        self
    }

    /// Attach a link inspector for HTTP(S) payloads
    pub fn with_inspector(
        mut self,
        inspector: Arc<dyn LinkInspector>,
        form_count_threshold: usize,
    ) -> Self {
        self.content = self.content.with_inspector(inspector, form_count_threshold);
        self
    }

    /// Decode bytes to the raster every analysis path works on
    pub fn load_raster(&self, image: &[u8]) -> std::result::Result<Raster, image::ImageError> {
        Raster::decode(image, self.max_dimension)
    }

    /// Analyze encoded image bytes. Never fails: anything unreadable is a
    /// high-risk verdict.
    pub fn analyze(&self, image: &[u8]) -> Verdict {
        match self.load_raster(image) {
            Ok(raster) => self.analyze_raster(&raster),
            Err(err) => {
                tracing::debug!(error = %err, bytes = image.len(), "input is not a decodable image");
                Verdict::unreadable(UnreadableCause::NotAnImage, None)
            }
        }
    }

    /// Analyze an already decoded raster
    pub fn analyze_raster(&self, raster: &Raster) -> Verdict {
        match self.inspect(raster) {
            Inspection::Unreadable { cause, metrics } => Verdict::unreadable(cause, metrics),
            Inspection::Readable { payload, evidence } => {
                let assessment = self.scorer.assess(&evidence);
                tracing::debug!(
                    scorer = self.scorer.name(),
                    score = assessment.score,
                    is_fraud = assessment.is_fraud,
                    confidence = %assessment.confidence,
                    "scored"
                );
                Verdict {
                    is_fraud: assessment.is_fraud,
                    confidence: assessment.confidence,
                    content_type: evidence.content.content_type,
                    decoded_data: truncate_payload(&payload, self.max_decoded_chars),
                    reasons: assessment.reasons,
                    score: Some(assessment.score),
                    structural_metrics: Some(evidence.structure),
                    features: Some(evidence.features),
                }
            }
        }
    }

    /// Feature vector of a readable image, as fed to the classifier.
    ///
    /// Unreadable images yield the cause instead.
    pub fn extract_features(
        &self,
        image: &[u8],
    ) -> std::result::Result<FeatureVector, UnreadableCause> {
        let raster = self
            .load_raster(image)
            .map_err(|_| UnreadableCause::NotAnImage)?;
        match self.inspect(&raster) {
            Inspection::Readable { evidence, .. } => Ok(evidence.features),
            Inspection::Unreadable { cause, .. } => Err(cause),
        }
    }

    /// Decode, measure and classify without scoring
    pub fn inspect(&self, raster: &Raster) -> Inspection {
        let (payload, geometry) = match self.reader.read(raster) {
            DecodeOutcome::Decoded { payload, geometry } => (payload, geometry),
            DecodeOutcome::Corrupted { geometry } => {
                tracing::debug!("QR code located but not decodable");
                return self.unreadable(raster, UnreadableCause::CorruptedPayload, Some(&geometry));
            }
            DecodeOutcome::NotFound => {
                tracing::debug!(
                    width = raster.width(),
                    height = raster.height(),
                    "no QR code found"
                );
                return self.unreadable(raster, UnreadableCause::NoCode, None);
            }
        };

        if payload.is_empty() {
            tracing::debug!("QR code decoded to an empty payload");
            return self.unreadable(raster, UnreadableCause::EmptyPayload, geometry.as_ref());
        }

        let metrics = self.structural.analyze(raster, geometry.as_ref());
        tracing::debug!(
            relative_size = metrics.relative_size,
            bw_ratio = metrics.bw_ratio,
            density = metrics.density,
            has_logo = metrics.has_logo,
            "structural metrics"
        );

        let signals = self.content.classify(&payload);
        tracing::debug!(
            content_type = %signals.content_type,
            tokens = signals.suspicious_tokens.len(),
            "classified payload"
        );

        Inspection::Readable {
            payload,
            evidence: Evidence::new(metrics, signals),
        }
    }

    fn unreadable(
        &self,
        raster: &Raster,
        cause: UnreadableCause,
        geometry: Option<&QrGeometry>,
    ) -> Inspection {
        Inspection::Unreadable {
            cause,
            metrics: Some(self.structural.analyze(raster, geometry)),
        }
    }
}
