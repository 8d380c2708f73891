use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

use crate::config::{ProviderConfig, ProxyConfig, ProxyType};
use crate::core::providers::unified_provider::ProviderError;

/// Unified connection pool configuration
pub struct PoolConfig;
impl PoolConfig {
    pub const CONNECT_TIMEOUT_SECS: u64 = 10;
    pub const KEEPALIVE_SECS: u64 = 90;
}

/// Shared HTTP client for one provider.
///
/// Request timeouts are applied per request so streaming bodies are not cut
/// off by a client-wide deadline.
#[derive(Debug, Clone)]
pub struct ConnectionPool {
    client: Arc<Client>,
}

impl ConnectionPool {
    /// Create a client sized and proxied from the provider configuration
    pub fn new(provider: &str, config: &ProviderConfig) -> Result<Self, ProviderError> {
        let mut builder = Client::builder()
            .connect_timeout(Duration::from_secs(PoolConfig::CONNECT_TIMEOUT_SECS))
            .pool_idle_timeout(Duration::from_secs(PoolConfig::KEEPALIVE_SECS))
            .pool_max_idle_per_host(config.concurrency_and_buffer_size.concurrency);

        if let Some(proxy) = &config.proxy_config {
            builder = builder.proxy(build_proxy(provider, proxy)?);
        }

        let client = builder.build().map_err(|e| {
            ProviderError::configuration(provider, format!("Failed to create HTTP client: {}", e))
        })?;

        Ok(Self {
            client: Arc::new(client),
        })
    }

    /// Get the underlying reqwest client
    pub fn client(&self) -> &Client {
        &self.client
    }
}

fn build_proxy(provider: &str, proxy: &ProxyConfig) -> Result<reqwest::Proxy, ProviderError> {
    let url = match proxy.proxy_type {
        ProxyType::Http => proxy.url.clone(),
        ProxyType::Socks5 if proxy.url.starts_with("socks5") => proxy.url.clone(),
        ProxyType::Socks5 => format!("socks5://{}", proxy.url),
    };

    let mut built = reqwest::Proxy::all(&url)
        .map_err(|e| ProviderError::configuration(provider, format!("Invalid proxy: {}", e)))?;

    if let Some(username) = &proxy.username {
        built = built.basic_auth(username, proxy.password.as_deref().unwrap_or_default());
    }

    Ok(built)
}
