//! Optional live inspection of link targets.
//!
//! A page that hosts several forms is a common credential-harvesting shape.
//! Fetching is best-effort: every failure collapses to "no information".

use regex::Regex;
use std::sync::OnceLock;
use std::time::Duration;

/// Capability that inspects the page behind a link
pub trait LinkInspector: Send + Sync {
    /// Number of HTML forms on the page, or `None` if it could not be fetched
    fn count_forms(&self, url: &str) -> Option<usize>;
}

/// Inspector used when enrichment is disabled
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopInspector;

impl LinkInspector for NoopInspector {
    fn count_forms(&self, _url: &str) -> Option<usize> {
        None
    }
}

static FORM_TAG: OnceLock<Regex> = OnceLock::new();

/// Count `<form` opening tags in an HTML document
pub fn count_form_tags(html: &str) -> usize {
    FORM_TAG
        .get_or_init(|| Regex::new(r"(?i)<form[\s>/]").expect("static form pattern"))
        .find_iter(html)
        .count()
}

/// Blocking GET with a hard timeout
pub struct HttpFormInspector {
    agent: ureq::Agent,
}

impl HttpFormInspector {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .redirects(5)
            .build();
        Self { agent }
    }
}

impl LinkInspector for HttpFormInspector {
    fn count_forms(&self, url: &str) -> Option<usize> {
        let response = match self.agent.get(url).call() {
            Ok(response) => response,
            Err(ureq::Error::Status(code, _)) => {
                tracing::warn!(url, code, "link inspection got error status");
                return None;
            }
            Err(err) => {
                tracing::debug!(url, error = %err, "link inspection failed");
                return None;
            }
        };

        match response.into_string() {
            Ok(body) => Some(count_form_tags(&body)),
            Err(err) => {
                tracing::debug!(url, error = %err, "link inspection body unreadable");
                None
            }
        }
    }
}
