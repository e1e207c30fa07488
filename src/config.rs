//! Tunable thresholds and weights.
//!
//! Configuration is layered: built-in defaults, then an optional TOML file,
//! then `QR_*` environment variables. Every layer is validated.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SentryConfig {
    pub input: InputConfig,
    pub structural: StructuralConfig,
    pub content: ContentConfig,
    pub enrichment: EnrichmentConfig,
    pub scoring: ScoringConfig,
    pub output: OutputConfig,
}

/// Image loading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct InputConfig {
    /// Images whose longer side exceeds this are downscaled before analysis;
    /// 0 keeps the original size
    pub max_dimension: u32,
}

impl InputConfig {
    /// Downscale limit, `None` when disabled
    pub fn max_dimension(&self) -> Option<u32> {
        (self.max_dimension > 0).then_some(self.max_dimension)
    }
}

/// Pixel-statistic thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructuralConfig {
    /// Intensities at or below this are ink
    pub binarization_threshold: u8,
    /// Start of the center crop, as a fraction of each axis
    pub logo_region_start: f64,
    /// End of the center crop, as a fraction of each axis
    pub logo_region_end: f64,
    /// Center black fraction below this means a logo overlay
    pub logo_black_ratio_max: f64,
    /// Codes covering less of the frame than this are "small"
    pub small_size_threshold: f64,
    pub bw_ratio_min: f64,
    pub bw_ratio_max: f64,
    pub density_min: f64,
    pub density_max: f64,
}

impl Default for StructuralConfig {
    fn default() -> Self {
        Self {
            binarization_threshold: 128,
            logo_region_start: 0.35,
            logo_region_end: 0.65,
            logo_black_ratio_max: 0.15,
            small_size_threshold: 0.03,
            bw_ratio_min: 0.15,
            bw_ratio_max: 3.0,
            density_min: 0.15,
            density_max: 0.75,
        }
    }
}

/// Payload classification settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Case-insensitive tokens that mark a link as a likely lure
    pub suspicious_tokens: Vec<String>,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            suspicious_tokens: ["login", "verify", "bank", "update", "secure"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Optional live fetch of link targets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichmentConfig {
    pub enabled: bool,
    /// Total budget for one fetch
    pub timeout_ms: u64,
    /// Pages with more forms than this are flagged
    pub form_count_threshold: usize,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            timeout_ms: 3000,
            form_count_threshold: 3,
        }
    }
}

/// Which scorer turns evidence into a verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScoringStrategy {
    /// Weighted anomaly rules
    #[default]
    Rules,
    /// Trained random forest loaded from `model_path`
    Model,
}

impl std::str::FromStr for ScoringStrategy {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rules" => Ok(ScoringStrategy::Rules),
            "model" => Ok(ScoringStrategy::Model),
            _ => Err(format!("Unknown strategy: {s}. Use 'rules' or 'model'.")),
        }
    }
}

/// Per-anomaly weights of the rule scorer; 0 disables a rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleWeights {
    pub small_code: f64,
    pub abnormal_bw_ratio: f64,
    pub abnormal_density: f64,
    pub logo_occlusion: f64,
    pub insecure_transport: f64,
    pub malformed_upi: f64,
    pub suspicious_token: f64,
    pub form_heavy_page: f64,
}

impl Default for RuleWeights {
    fn default() -> Self {
        Self {
            small_code: 1.0,
            abnormal_bw_ratio: 1.0,
            abnormal_density: 1.0,
            logo_occlusion: 0.5,
            insecure_transport: 1.5,
            malformed_upi: 2.5,
            suspicious_token: 2.5,
            form_heavy_page: 1.5,
        }
    }
}

impl RuleWeights {
    fn all(&self) -> [(&'static str, f64); 8] {
        [
            ("small_code", self.small_code),
            ("abnormal_bw_ratio", self.abnormal_bw_ratio),
            ("abnormal_density", self.abnormal_density),
            ("logo_occlusion", self.logo_occlusion),
            ("insecure_transport", self.insecure_transport),
            ("malformed_upi", self.malformed_upi),
            ("suspicious_token", self.suspicious_token),
            ("form_heavy_page", self.form_heavy_page),
        ]
    }
}

/// Scorer selection and decision thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub strategy: ScoringStrategy,
    /// Random forest artifact, read only for the `model` strategy
    pub model_path: PathBuf,
    /// Rule score at or above this is fraud
    pub fraud_threshold: f64,
    /// Rule score at or above this is High confidence
    pub high_band: f64,
    /// Rule score at or above this is Medium confidence
    pub medium_band: f64,
    /// A validated UPI payload resets the rule score to 0
    pub upi_override: bool,
    pub weights: RuleWeights,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            strategy: ScoringStrategy::Rules,
            model_path: PathBuf::from("model.json"),
            fraud_threshold: 2.5,
            high_band: 2.5,
            medium_band: 1.5,
            upi_override: true,
            weights: RuleWeights::default(),
        }
    }
}

/// Verdict formatting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// `decoded_data` is cut to this many characters
    pub max_decoded_chars: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            max_decoded_chars: 200,
        }
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(val) => val
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::Validation(format!("Invalid {name}: {val:?}"))),
        Err(_) => Ok(None),
    }
}

fn parse_env_bool(name: &str) -> Result<Option<bool>, ConfigError> {
    match env::var(name) {
        Ok(val) => match val.trim() {
            "1" | "true" | "TRUE" | "yes" | "YES" => Ok(Some(true)),
            "0" | "false" | "FALSE" | "no" | "NO" => Ok(Some(false)),
            _ => Err(ConfigError::Validation(format!("Invalid {name}: {val:?}"))),
        },
        Err(_) => Ok(None),
    }
}

fn check_fraction(name: &str, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::Validation(format!("{name} must be in [0, 1]")));
    }
    Ok(())
}

fn check_range(name: &str, min: f64, max: f64) -> Result<(), ConfigError> {
    if !min.is_finite() || !max.is_finite() || min < 0.0 || min > max {
        return Err(ConfigError::Validation(format!(
            "{name} bounds must satisfy 0 <= min <= max"
        )));
    }
    Ok(())
}

impl SentryConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: SentryConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults, overridden by `path`, overridden by the environment.
    ///
    /// A given `path` must exist; only `None` means "no file".
    pub fn load_layered(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => SentryConfig::default(),
        };

        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides
    pub(crate) fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(v) = parse_env::<u32>("QR_MAX_DIM")? {
            self.input.max_dimension = v;
        }
        if let Some(v) = parse_env::<u8>("QR_BINARIZATION_THRESHOLD")? {
            self.structural.binarization_threshold = v;
        }
        if let Some(v) = parse_env::<f64>("QR_FRAUD_THRESHOLD")? {
            self.scoring.fraud_threshold = v;
        }
        if let Ok(val) = env::var("QR_SCORING_STRATEGY") {
            self.scoring.strategy = val.parse().map_err(ConfigError::Validation)?;
        }
        if let Ok(val) = env::var("QR_MODEL_PATH") {
            self.scoring.model_path = PathBuf::from(val);
        }
        if let Some(v) = parse_env_bool("QR_UPI_OVERRIDE")? {
            self.scoring.upi_override = v;
        }
        if let Some(v) = parse_env_bool("QR_ENRICHMENT_ENABLED")? {
            self.enrichment.enabled = v;
        }
        if let Some(v) = parse_env::<u64>("QR_ENRICHMENT_TIMEOUT_MS")? {
            self.enrichment.timeout_ms = v;
        }
        if let Some(v) = parse_env::<usize>("QR_MAX_DECODED_CHARS")? {
            self.output.max_decoded_chars = v;
        }
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        let s = &self.structural;
        check_fraction("structural.logo_region_start", s.logo_region_start)?;
        check_fraction("structural.logo_region_end", s.logo_region_end)?;
        if s.logo_region_start >= s.logo_region_end {
            return Err(ConfigError::Validation(
                "structural.logo_region_start must be < logo_region_end".to_string(),
            ));
        }
        check_fraction("structural.logo_black_ratio_max", s.logo_black_ratio_max)?;
        check_fraction("structural.small_size_threshold", s.small_size_threshold)?;
        check_range("structural.bw_ratio", s.bw_ratio_min, s.bw_ratio_max)?;
        check_range("structural.density", s.density_min, s.density_max)?;
        check_fraction("structural.density_max", s.density_max)?;

        if self
            .content
            .suspicious_tokens
            .iter()
            .any(|t| t.trim().is_empty())
        {
            return Err(ConfigError::Validation(
                "content.suspicious_tokens must not contain empty entries".to_string(),
            ));
        }

        if self.enrichment.enabled && self.enrichment.timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "enrichment.timeout_ms must be positive when enrichment is enabled".to_string(),
            ));
        }

        let sc = &self.scoring;
        if !sc.fraud_threshold.is_finite() || sc.fraud_threshold < 0.0 {
            return Err(ConfigError::Validation(
                "scoring.fraud_threshold must be a non-negative number".to_string(),
            ));
        }
        if !sc.high_band.is_finite() || !sc.medium_band.is_finite() {
            return Err(ConfigError::Validation(
                "scoring.high_band and scoring.medium_band must be finite".to_string(),
            ));
        }
        if sc.medium_band < 0.0 || sc.medium_band > sc.high_band {
            return Err(ConfigError::Validation(
                "scoring.medium_band must be in [0, high_band]".to_string(),
            ));
        }
        for (name, weight) in sc.weights.all() {
            if !weight.is_finite() || weight < 0.0 {
                return Err(ConfigError::Validation(format!(
                    "scoring.weights.{name} must be a non-negative number"
                )));
            }
        }

        if self.output.max_decoded_chars == 0 {
            return Err(ConfigError::Validation(
                "output.max_decoded_chars must be positive".to_string(),
            ));
        }

        Ok(())
    }

    /// Render as TOML
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
