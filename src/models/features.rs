use serde::{Deserialize, Serialize};

/// Column names of the feature vector, in model order
pub const FEATURE_NAMES: [&str; 5] = [
    "is_https",
    "domain_length",
    "has_suspicious_words",
    "is_upi",
    "has_logo",
];

/// Payload classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentType {
    /// `upi://` payment URI
    #[serde(rename = "UPI")]
    Upi,
    /// `https://` link
    #[serde(rename = "HTTPS URL")]
    HttpsUrl,
    /// `http://` link
    #[serde(rename = "HTTP URL")]
    HttpUrl,
    /// Plain text, Wi-Fi configs, contact cards, deep links
    #[serde(rename = "Text")]
    Text,
    /// Nothing could be read
    #[serde(rename = "Unknown")]
    Unknown,
}

impl ContentType {
    /// Display label, identical to the serialized form
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Upi => "UPI",
            ContentType::HttpsUrl => "HTTPS URL",
            ContentType::HttpUrl => "HTTP URL",
            ContentType::Text => "Text",
            ContentType::Unknown => "Unknown",
        }
    }

    /// True for HTTP and HTTPS links
    pub fn is_url(&self) -> bool {
        matches!(self, ContentType::HttpsUrl | ContentType::HttpUrl)
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pixel statistics of the whole image
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StructuralMetrics {
    /// Code bounding-box area over image area, in [0, 1]
    pub relative_size: f64,
    /// black / (white + 1)
    pub bw_ratio: f64,
    /// black / (black + white), in [0, 1]
    pub density: f64,
    /// Center crop is mostly blank
    pub has_logo: bool,
    /// Black fraction of the center crop
    pub center_black_ratio: f64,
    /// Pixels at or below the binarization threshold
    pub black_pixels: usize,
    /// Pixels above the binarization threshold
    pub white_pixels: usize,
    /// Whether corner geometry was available for `relative_size`
    pub has_geometry: bool,
}

/// Content-level signals extracted from a decoded payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentSignals {
    /// Detected payload type
    pub content_type: ContentType,
    /// Link uses TLS
    pub is_https: bool,
    /// Length of the URL authority, 0 for non-links
    pub domain_length: usize,
    /// Configured tokens found in the payload, in configuration order
    pub suspicious_tokens: Vec<String>,
    /// Plain `http://` link
    pub insecure_transport: bool,
    /// `upi://` payload without a usable payee/name
    pub malformed_upi: bool,
    /// Number of `<form>` elements on the fetched page, if fetched
    pub form_count: Option<usize>,
    /// `form_count` exceeded the configured limit
    pub form_heavy: bool,
}

impl ContentSignals {
    /// Signals for a payload with no URL/UPI-specific content
    pub fn text() -> Self {
        Self {
            content_type: ContentType::Text,
            is_https: false,
            domain_length: 0,
            suspicious_tokens: Vec::new(),
            insecure_transport: false,
            malformed_upi: false,
            form_count: None,
            form_heavy: false,
        }
    }

    /// UPI payload that passed validation
    pub fn is_valid_upi(&self) -> bool {
        self.content_type == ContentType::Upi && !self.malformed_upi
    }

    /// Collapsed suspicious flag used by the feature vector
    pub fn has_suspicious_words(&self) -> bool {
        !self.suspicious_tokens.is_empty()
            || self.malformed_upi
            || self.insecure_transport
            || self.form_heavy
    }
}

/// Fixed-order model input:
/// `[is_https, domain_length, has_suspicious_words, is_upi, has_logo]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FeatureVector {
    /// 1 for `https://` links
    pub is_https: u8,
    /// URL authority length, 0 otherwise
    pub domain_length: u32,
    /// 1 if any content risk flag fired
    pub has_suspicious_words: u8,
    /// 1 for `upi://` payloads
    pub is_upi: u8,
    /// 1 if the center crop looks like a logo overlay
    pub has_logo: u8,
}

impl FeatureVector {
    /// Assemble the vector from the two independent feature sources
    pub fn from_parts(content: &ContentSignals, structure: &StructuralMetrics) -> Self {
        let is_url = content.content_type.is_url();
        Self {
            is_https: u8::from(content.is_https),
            domain_length: if is_url {
                content.domain_length.min(u32::MAX as usize) as u32
            } else {
                0
            },
            has_suspicious_words: u8::from(content.has_suspicious_words()),
            is_upi: u8::from(content.content_type == ContentType::Upi),
            has_logo: u8::from(structure.has_logo),
        }
    }

    /// Values in model column order
    pub fn to_array(&self) -> [f64; 5] {
        [
            self.is_https as f64,
            self.domain_length as f64,
            self.has_suspicious_words as f64,
            self.is_upi as f64,
            self.has_logo as f64,
        ]
    }
}
