//! Operation policy gate
//!
//! Decides, before any network activity, whether a provider may serve a
//! given request type.

use std::sync::Arc;

use crate::config::CustomProviderConfig;
use crate::core::providers::unified_provider::ProviderError;
use crate::core::types::RequestType;

/// Gate consulted first by every dispatch operation
pub trait OperationPolicy: Send + Sync + std::fmt::Debug {
    fn check_allowed(&self, provider: &str, request_type: RequestType)
    -> Result<(), ProviderError>;
}

/// Policy driven by the provider's custom configuration.
///
/// Without a custom configuration every request type is allowed.
#[derive(Debug, Clone, Default)]
pub struct ConfigOperationPolicy {
    custom_provider_config: Option<CustomProviderConfig>,
}

impl ConfigOperationPolicy {
    pub fn new(custom_provider_config: Option<CustomProviderConfig>) -> Self {
        Self {
            custom_provider_config,
        }
    }

    pub fn shared(custom_provider_config: Option<CustomProviderConfig>) -> Arc<dyn OperationPolicy> {
        Arc::new(Self::new(custom_provider_config))
    }
}

impl OperationPolicy for ConfigOperationPolicy {
    fn check_allowed(
        &self,
        provider: &str,
        request_type: RequestType,
    ) -> Result<(), ProviderError> {
        match &self.custom_provider_config {
            Some(custom) if !custom.is_allowed(request_type) => {
                tracing::debug!(provider, %request_type, "request type rejected by policy");
                Err(ProviderError::operation_not_allowed(
                    provider,
                    request_type.as_str(),
                ))
            }
            _ => Ok(()),
        }
    }
}
