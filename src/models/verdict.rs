use serde::Serialize;

use super::features::{ContentType, FeatureVector, StructuralMetrics};

/// Ordinal confidence attached to a verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Confidence {
    /// Weak evidence
    Low,
    /// Some evidence
    Medium,
    /// Strong evidence
    High,
}

impl Confidence {
    /// Label, identical to the serialized form
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::Low => "Low",
            Confidence::Medium => "Medium",
            Confidence::High => "High",
        }
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an image ended on the unreadable path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnreadableCause {
    /// Bytes did not decode as an image
    NotAnImage,
    /// No QR pattern located
    NoCode,
    /// A code was located but its payload failed to decode
    CorruptedPayload,
    /// The code decoded to an empty string
    EmptyPayload,
}

impl UnreadableCause {
    /// Reason line; always starts with "unreadable"
    pub fn reason(&self) -> &'static str {
        match self {
            UnreadableCause::NotAnImage => "unreadable: image data could not be decoded",
            UnreadableCause::NoCode => "unreadable: no QR code found in image",
            UnreadableCause::CorruptedPayload => {
                "unreadable: QR code located but payload could not be decoded"
            }
            UnreadableCause::EmptyPayload => "unreadable: QR code payload is empty",
        }
    }
}

/// Final answer for one analyzed image
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    /// Whether the code should be treated as fraudulent
    pub is_fraud: bool,
    /// Strength of the decision
    pub confidence: Confidence,
    /// Classified payload type
    pub content_type: ContentType,
    /// Payload, truncated for display
    pub decoded_data: String,
    /// Human-readable triggers, most structural first
    pub reasons: Vec<String>,
    /// Rule score or fraud probability; absent when unreadable
    pub score: Option<f64>,
    /// Pixel statistics; absent when the bytes were not an image
    pub structural_metrics: Option<StructuralMetrics>,
    /// Model input vector; absent when unreadable
    pub features: Option<FeatureVector>,
}

impl Verdict {
    /// Fixed maximal-risk verdict for images without a readable payload
    pub fn unreadable(cause: UnreadableCause, metrics: Option<StructuralMetrics>) -> Self {
        Self {
            is_fraud: true,
            confidence: Confidence::High,
            content_type: ContentType::Unknown,
            decoded_data: String::new(),
            reasons: vec![cause.reason().to_string()],
            score: None,
            structural_metrics: metrics,
            features: None,
        }
    }
}

/// Cut `payload` to at most `max_chars` characters, on a char boundary
pub fn truncate_payload(payload: &str, max_chars: usize) -> String {
    match payload.char_indices().nth(max_chars) {
        Some((idx, _)) => payload[..idx].to_string(),
        None => payload.to_string(),
    }
}
