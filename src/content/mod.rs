//! Payload classification and content-level risk signals.

pub mod enrich;
pub mod upi;
pub mod url;

use std::sync::Arc;

use crate::config::{ContentConfig, EnrichmentConfig};
use crate::models::{ContentSignals, ContentType};
use enrich::{LinkInspector, NoopInspector};

const HTTPS_PREFIX: &str = "https://";
const HTTP_PREFIX: &str = "http://";

/// Classifies decoded payloads by scheme prefix
#[derive(Clone)]
pub struct ContentClassifier {
    tokens: Vec<String>,
    inspector: Arc<dyn LinkInspector>,
    form_count_threshold: usize,
}

impl std::fmt::Debug for ContentClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentClassifier")
            .field("tokens", &self.tokens)
            .field("form_count_threshold", &self.form_count_threshold)
            .finish_non_exhaustive()
    }
}

impl ContentClassifier {
    /// Offline classifier: no link inspection
    pub fn new(config: &ContentConfig) -> Self {
        Self {
            tokens: config.suspicious_tokens.clone(),
            inspector: Arc::new(NoopInspector),
            form_count_threshold: EnrichmentConfig::default().form_count_threshold,
        }
    }

    /// Attach a link inspector consulted for HTTP(S) payloads
    pub fn with_inspector(
        mut self,
        inspector: Arc<dyn LinkInspector>,
        form_count_threshold: usize,
    ) -> Self {
        self.inspector = inspector;
        self.form_count_threshold = form_count_threshold;
        self
    }

    /// Classify one payload
    pub fn classify(&self, payload: &str) -> ContentSignals {
        if payload.starts_with(upi::UPI_PREFIX) {
            return ContentSignals {
                content_type: ContentType::Upi,
                malformed_upi: !upi::is_valid(payload),
                ..ContentSignals::text()
            };
        }

        let (content_type, is_https) = if payload.starts_with(HTTPS_PREFIX) {
            (ContentType::HttpsUrl, true)
        } else if payload.starts_with(HTTP_PREFIX) {
            (ContentType::HttpUrl, false)
        } else {
            return ContentSignals::text();
        };

        let form_count = self.inspector.count_forms(payload);
        ContentSignals {
            content_type,
            is_https,
            domain_length: url::authority(payload).map(str::len).unwrap_or(0),
            suspicious_tokens: url::matching_tokens(payload, &self.tokens),
            insecure_transport: !is_https,
            malformed_upi: false,
            form_count,
            form_heavy: form_count.is_some_and(|n| n > self.form_count_threshold),
        }
    }
}
