//! Per-key target and model resolution.
//!
//! Both functions are pure and total: any key override, including none at
//! all, resolves to a usable base URL and a model name.

use tracing::debug;

use crate::config::DEFAULT_BASE_URL;
use crate::core::types::ApertusKeyConfig;

/// Normalize a configured provider default, substituting the built-in
/// default when it is empty
pub fn normalize_base_url(configured: &str) -> String {
    let trimmed = configured.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        DEFAULT_BASE_URL.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Base URL for a call made with a key carrying `key_override`.
///
/// A non-empty override endpoint wins, with trailing slashes removed;
/// otherwise the provider default is used.
pub fn effective_base_url(provider_default: &str, key_override: Option<&ApertusKeyConfig>) -> String {
    if let Some(endpoint) = key_override
        .map(ApertusKeyConfig::endpoint)
        .map(|e| e.trim().trim_end_matches('/'))
        .filter(|e| !e.is_empty())
    {
        return endpoint.to_string();
    }
    provider_default.trim_end_matches('/').to_string()
}

/// Model name sent upstream for a caller asking for `requested`.
///
/// Lookup is exact and case-sensitive; a miss passes the name through.
pub fn effective_model_name(key_override: Option<&ApertusKeyConfig>, requested: &str) -> String {
    match key_override.and_then(|config| config.mapped_model(requested)) {
        Some(mapped) => {
            debug!(requested, mapped, "model name mapped by key override");
            mapped.to_string()
        }
        None => requested.to_string(),
    }
}
