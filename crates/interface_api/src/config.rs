//! API configuration
//!
//! Loaded from an optional `damage-engine.{toml,yaml,json}` file, then from
//! `API_`-prefixed environment variables with `__` separating nested keys:
//!
//! ```text
//! API_PORT=9000
//! API_DATABASE_URL=postgres://localhost/damage_engine
//! API_DETECTOR__ENDPOINT=http://detector:8500
//! API_SCORING__WEIGHTS__IMAGE=0.6
//! API_ADJUDICATION__AUTO_APPROVE_THRESHOLD=0.75
//! ```

use serde::Deserialize;
use std::time::Duration;

use domain_assessment::{RemoteDetectorConfig, ScoringPolicy};
use domain_claims::{AdjudicationPolicy, ClaimNumberFormat};

/// Object-detection service settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DetectorSettings {
    /// Base URL of the inference service; without one every assessment
    /// takes the pixel-similarity path
    pub endpoint: Option<String>,
    pub model_name: String,
    pub min_confidence: f64,
    pub timeout_ms: u64,
}

impl Default for DetectorSettings {
    fn default() -> Self {
        let remote = RemoteDetectorConfig::default();
        Self {
            endpoint: None,
            model_name: remote.model_name,
            min_confidence: remote.min_confidence,
            timeout_ms: remote.timeout_ms,
        }
    }
}

impl DetectorSettings {
    /// Remote client settings, if an endpoint is configured
    pub fn remote(&self) -> Option<RemoteDetectorConfig> {
        let endpoint = self.endpoint.as_deref().map(str::trim).filter(|e| !e.is_empty())?;
        Some(RemoteDetectorConfig {
            endpoint: endpoint.to_string(),
            model_name: self.model_name.clone(),
            min_confidence: self.min_confidence,
            timeout_ms: self.timeout_ms,
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// API configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Log level, overridden by `RUST_LOG`
    pub log_level: String,
    /// Emit one JSON object per log line
    pub log_json: bool,
    /// PostgreSQL connection string; in-memory storage when absent
    pub database_url: Option<String>,
    /// Request body limit for image uploads
    pub max_upload_bytes: usize,
    pub detector: DetectorSettings,
    pub similarity_timeout_ms: u64,
    pub scoring: ScoringPolicy,
    pub adjudication: AdjudicationPolicy,
    pub numbering: ClaimNumberFormat,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            log_level: "info".to_string(),
            log_json: false,
            database_url: None,
            max_upload_bytes: 20 * 1024 * 1024,
            detector: DetectorSettings::default(),
            similarity_timeout_ms: 10_000,
            scoring: ScoringPolicy::default(),
            adjudication: AdjudicationPolicy::default(),
            numbering: ClaimNumberFormat::default(),
        }
    }
}

impl ApiConfig {
    /// Loads configuration from the optional config file and the environment
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::builder().build()?.try_deserialize()
    }

    /// Loads configuration from environment variables only
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(Self::environment())
            .build()?
            .try_deserialize()
    }

    fn builder() -> config::ConfigBuilder<config::builder::DefaultState> {
        config::Config::builder()
            .add_source(config::File::with_name("damage-engine").required(false))
            .add_source(Self::environment())
    }

    fn environment() -> config::Environment {
        config::Environment::with_prefix("API")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn similarity_timeout(&self) -> Duration {
        Duration::from_millis(self.similarity_timeout_ms)
    }
}
