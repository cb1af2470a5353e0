//! Configuration management for the triage client

use crate::error::{Result, TriageError};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Prefix for environment overrides, e.g. `TRIAGE__API__BASE_URL`
pub const ENV_PREFIX: &str = "TRIAGE";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TriageConfig {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub data_source: DataSource,

    #[serde(default)]
    pub mock: MockConfig,

    #[serde(default)]
    pub sender: SenderConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(alias = "url", default = "default_base_url")]
    pub base_url: String,

    /// Absent means requests may stay pending indefinitely
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: None,
        }
    }
}

/// Which data path the client talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    #[default]
    Remote,
    Mock,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MockConfig {
    /// Simulated round-trip delay of the in-memory path
    #[serde(default)]
    pub latency_ms: u64,

    /// JSON fixture file replacing the built-in fixtures
    #[serde(default)]
    pub fixtures_path: Option<PathBuf>,
}

/// Signature used when composing outreach letters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SenderConfig {
    #[serde(default = "default_organization")]
    pub organization: String,

    #[serde(default = "default_contact_email")]
    pub contact_email: String,
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            organization: default_organization(),
            contact_email: default_contact_email(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000/api".to_string()
}

fn default_organization() -> String {
    "Ural Federal University (UrFU)".to_string()
}

fn default_contact_email() -> String {
    "procompetencies@urfu.ru".to_string()
}

impl TriageConfig {
    /// Load configuration from a file, format taken from its extension
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(TriageError::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        let config = Config::builder()
            .add_source(File::from(path))
            .build()
            .map_err(|e| TriageError::Config(format!("Failed to read config file: {}", e)))?;

        Self::from_config(config)
    }

    /// Load configuration from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from_str(json, FileFormat::Json))
            .build()
            .map_err(|e| TriageError::Config(format!("Failed to parse config: {}", e)))?;

        Self::from_config(config)
    }

    /// Defaults, then the optional file, then `TRIAGE__*` environment variables
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            log::debug!("Layering config file {}", path.display());
            builder = builder.add_source(File::from(path).required(true));
        }

        let config = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| TriageError::Config(format!("Failed to load config: {}", e)))?;

        Self::from_config(config)
    }

    fn from_config(config: Config) -> Result<Self> {
        let parsed: Self = config
            .try_deserialize()
            .map_err(|e| TriageError::Config(format!("Invalid config: {}", e)))?;

        parsed.validate()?;
        Ok(parsed)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(TriageError::Config("API base_url is required".to_string()));
        }

        if let Err(e) = reqwest::Url::parse(&self.api.base_url) {
            return Err(TriageError::Config(format!(
                "API base_url '{}' is not a valid URL: {}",
                self.api.base_url, e
            )));
        }

        if self.api.timeout_secs == Some(0) {
            return Err(TriageError::Config(
                "api.timeout_secs must be positive; omit it to disable timeouts".to_string(),
            ));
        }

        if self.sender.contact_email.trim().is_empty() {
            return Err(TriageError::Config("sender.contact_email is required".to_string()));
        }

        Ok(())
    }
}
