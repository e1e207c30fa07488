//! qr_sentry - QR code fraud detection
//!
//! Decodes the QR code in an image, measures how the printed code looks,
//! classifies what it points to, and returns a [`Verdict`] saying whether the
//! code is likely tampered with or malicious.
//!
//! ```no_run
//! use qr_sentry::{Analyzer, SentryConfig};
//!
//! let analyzer = Analyzer::from_config(&SentryConfig::default())?;
//! let bytes = std::fs::read("code.png")?;
//! let verdict = analyzer.analyze(&bytes);
//! println!("fraud={} reasons={:?}", verdict.is_fraud, verdict.reasons);
//! # Ok::<(), qr_sentry::Error>(())
//! ```

/// Layered TOML/env configuration
pub mod config;
/// Payload classification (URL, UPI, text) and link enrichment
pub mod content;
/// QR payload extraction
pub mod decoder;
/// Crate-level error type
pub mod error;
/// Core data structures (Raster, BitMatrix, features, Verdict)
pub mod models;
/// End-to-end analyzer
pub mod pipeline;
/// Rule-based and learned fraud scoring
pub mod scoring;
/// Pixel-statistic features
pub mod structural;
/// File-system helpers for the CLI, benches and dataset extraction
pub mod tools;
/// Utility functions (grayscale, binarization)
pub mod utils;

pub use config::SentryConfig;
pub use error::{Error, Result};
pub use models::{Confidence, ContentType, FeatureVector, StructuralMetrics, Verdict};
pub use pipeline::Analyzer;

/// Analyze image bytes with the default configuration and rule scoring.
///
/// Builds a fresh [`Analyzer`] per call; hold one yourself for batches.
pub fn analyze(image: &[u8]) -> Result<Verdict> {
    let analyzer = Analyzer::from_config(&SentryConfig::default())?;
    Ok(analyzer.analyze(image))
}
