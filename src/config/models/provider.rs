//! Provider configuration

use super::*;
use crate::core::types::RequestType;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

/// Default upstream when a provider has no base URL configured
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Network settings shared by every request of a provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Provider default base URL
    #[serde(default)]
    pub base_url: String,
    /// Headers added to every outbound request
    #[serde(default)]
    pub extra_headers: HashMap<String, String>,
    #[serde(default = "default_timeout")]
    pub default_request_timeout_in_seconds: u64,
    /// Retries after the first attempt
    #[serde(default)]
    pub max_retries: u32,
    #[serde(default = "default_retry_backoff_initial_ms")]
    pub retry_backoff_initial_ms: u64,
    #[serde(default = "default_retry_backoff_max_ms")]
    pub retry_backoff_max_ms: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            extra_headers: HashMap::new(),
            default_request_timeout_in_seconds: default_timeout(),
            max_retries: 0,
            retry_backoff_initial_ms: default_retry_backoff_initial_ms(),
            retry_backoff_max_ms: default_retry_backoff_max_ms(),
        }
    }
}

impl NetworkConfig {
    /// Replace zero values with defaults
    pub fn check_and_set_defaults(&mut self) {
        if self.default_request_timeout_in_seconds == 0 {
            self.default_request_timeout_in_seconds = default_timeout();
        }
        if self.retry_backoff_initial_ms == 0 {
            self.retry_backoff_initial_ms = default_retry_backoff_initial_ms();
        }
        if self.retry_backoff_max_ms == 0 {
            self.retry_backoff_max_ms = default_retry_backoff_max_ms();
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.default_request_timeout_in_seconds)
    }

    pub fn retry_backoff_initial(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_initial_ms)
    }

    pub fn retry_backoff_max(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_max_ms)
    }
}

/// Connection pool sizing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConcurrencyAndBufferSize {
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
}

impl Default for ConcurrencyAndBufferSize {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            buffer_size: default_buffer_size(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProxyType {
    Http,
    Socks5,
}

/// Outbound proxy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyConfig {
    #[serde(rename = "type")]
    pub proxy_type: ProxyType,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// Configuration for a provider registered under its own name on top of a
/// built-in provider type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomProviderConfig {
    /// Name the provider reports as its identity
    #[serde(default)]
    pub custom_provider_key: String,
    /// Built-in provider type this one is based on
    #[serde(default)]
    pub base_provider_type: String,
    /// Per-request-type switches; absent types are allowed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_requests: Option<BTreeMap<RequestType, bool>>,
    /// Path suffixes replacing the fixed ones
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub request_path_overrides: BTreeMap<RequestType, String>,
}

impl CustomProviderConfig {
    pub fn is_allowed(&self, request_type: RequestType) -> bool {
        self.allowed_requests
            .as_ref()
            .and_then(|allowed| allowed.get(&request_type).copied())
            .unwrap_or(true)
    }

    pub fn path_override(&self, request_type: RequestType) -> Option<&str> {
        self.request_path_overrides
            .get(&request_type)
            .map(String::as_str)
            .filter(|p| !p.is_empty())
    }
}

/// Everything the gateway knows about one provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub network_config: NetworkConfig,
    #[serde(default)]
    pub concurrency_and_buffer_size: ConcurrencyAndBufferSize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_config: Option<ProxyConfig>,
    /// Attach upstream payloads to responses
    #[serde(default)]
    pub send_back_raw_response: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_provider_config: Option<CustomProviderConfig>,
}

impl ProviderConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !self.network_config.base_url.is_empty() {
            url::Url::parse(&self.network_config.base_url)
                .map_err(|e| format!("invalid base_url '{}': {}", self.network_config.base_url, e))?;
        }
        if let Some(custom) = &self.custom_provider_config {
            if custom.base_provider_type.is_empty() {
                return Err(
                    "base_provider_type is required when custom_provider_config is set".to_string(),
                );
            }
            if custom.custom_provider_key.is_empty() {
                return Err(
                    "custom_provider_key is required when custom_provider_config is set"
                        .to_string(),
                );
            }
            for (request_type, path) in &custom.request_path_overrides {
                if !path.is_empty() && !path.starts_with('/') {
                    return Err(format!(
                        "request path override for {} must start with '/': {}",
                        request_type, path
                    ));
                }
            }
        }
        if let Some(proxy) = &self.proxy_config {
            url::Url::parse(&proxy.url)
                .map_err(|e| format!("invalid proxy url '{}': {}", proxy.url, e))?;
        }
        if self.concurrency_and_buffer_size.concurrency == 0 {
            return Err("concurrency must be greater than 0".to_string());
        }
        Ok(())
    }
}

fn default_retry_backoff_initial_ms() -> u64 {
    500
}

fn default_retry_backoff_max_ms() -> u64 {
    5_000
}

fn default_concurrency() -> usize {
    1000
}

fn default_buffer_size() -> usize {
    5000
}
