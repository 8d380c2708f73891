//! Configuration management
//!
//! Loads, validates and exposes the provider, storage and logging settings.

pub mod models;

pub use models::*;

use crate::utils::error::{GatewayError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Main configuration struct
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Apertus provider settings
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| GatewayError::Config(format!("Failed to read config file: {}", e)))?;

        let config = Self::from_yaml_str(&content)?;

        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Parse and validate YAML configuration
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let mut config: Config = serde_yaml::from_str(content)
            .map_err(|e| GatewayError::Config(format!("Failed to parse config: {}", e)))?;
        config.provider.network_config.check_and_set_defaults();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let mut config = Config::default();
        if let Ok(base_url) = std::env::var("APERTUS_BASE_URL") {
            config.provider.network_config.base_url = base_url;
        }
        if let Ok(timeout) = std::env::var("APERTUS_TIMEOUT") {
            config.provider.network_config.default_request_timeout_in_seconds =
                timeout.parse().map_err(|e| {
                    GatewayError::Config(format!("Invalid APERTUS_TIMEOUT '{}': {}", timeout, e))
                })?;
        }
        if let Ok(retries) = std::env::var("APERTUS_MAX_RETRIES") {
            config.provider.network_config.max_retries = retries.parse().map_err(|e| {
                GatewayError::Config(format!("Invalid APERTUS_MAX_RETRIES '{}': {}", retries, e))
            })?;
        }
        if let Ok(raw) = std::env::var("APERTUS_SEND_BACK_RAW_RESPONSE") {
            config.provider.send_back_raw_response = matches!(raw.as_str(), "1" | "true");
        }
        if let Ok(url) = std::env::var("DATABASE_URL") {
            config.storage.database.url = url;
        }
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            config.logging.level = level;
        }

        config.provider.network_config.check_and_set_defaults();
        config.validate()?;
        Ok(config)
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        debug!("Validating configuration");

        self.provider
            .validate()
            .map_err(|e| GatewayError::Config(format!("Provider config error: {}", e)))?;

        self.storage
            .database
            .validate()
            .map_err(|e| GatewayError::Config(format!("Database config error: {}", e)))?;

        Ok(())
    }

    /// Convert to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| GatewayError::Config(format!("Failed to serialize config to YAML: {}", e)))
    }
}
