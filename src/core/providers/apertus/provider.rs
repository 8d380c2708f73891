//! Apertus request dispatcher

use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

use super::resolver::{effective_base_url, effective_model_name, normalize_base_url};
use crate::config::{CustomProviderConfig, NetworkConfig, ProviderConfig};
use crate::core::providers::base::{ConfigOperationPolicy, ConnectionPool, OperationPolicy};
use crate::core::providers::openai_compatible::{
    OpenAICompatibleHandler, ProviderStream, RequestTarget,
};
use crate::core::providers::unified_provider::ProviderError;
use crate::core::types::{
    ChatRequest, ChatResponse, EmbeddingRequest, EmbeddingResponse, Key, ListModelsResponse,
    ModelDescriptor, ModelRequest, RequestType, ResponseExtraFields, ResponsesRequest,
    ResponsesResponse, SpeechRequest, SpeechResponse, TextCompletionRequest,
    TextCompletionResponse, TranscriptionRequest, TranscriptionResponse,
};
use crate::utils::error::RetryConfig;

/// Built-in provider name
pub const PROVIDER_NAME: &str = "apertus";

/// OpenAI-compatible provider whose target and model are resolved per key
#[derive(Debug, Clone)]
pub struct ApertusProvider {
    identity: String,
    base_url: String,
    network_config: Arc<NetworkConfig>,
    send_back_raw_response: bool,
    custom_provider_config: Option<CustomProviderConfig>,
    policy: Arc<dyn OperationPolicy>,
    handler: OpenAICompatibleHandler,
}

impl ApertusProvider {
    /// Create a provider from its configuration
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        let identity = provider_identity(config.custom_provider_config.as_ref());
        config
            .validate()
            .map_err(|e| ProviderError::configuration(&identity, e))?;

        let mut network_config = config.network_config.clone();
        network_config.check_and_set_defaults();
        let base_url = normalize_base_url(&network_config.base_url);

        let pool = ConnectionPool::new(&identity, &config)?;

        debug!(provider = %identity, base_url = %base_url, "apertus provider initialized");

        Ok(Self {
            policy: ConfigOperationPolicy::shared(config.custom_provider_config.clone()),
            identity,
            base_url,
            network_config: Arc::new(network_config),
            send_back_raw_response: config.send_back_raw_response,
            custom_provider_config: config.custom_provider_config,
            handler: OpenAICompatibleHandler::new(pool),
        })
    }

    /// Replace the operation policy
    pub fn with_policy(mut self, policy: Arc<dyn OperationPolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// Identity reported on every response and error
    pub fn provider_key(&self) -> &str {
        &self.identity
    }

    /// Normalized provider default base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL a request of `request_type` made with `key` is sent to
    pub fn request_url(&self, key: &Key, request_type: RequestType) -> String {
        let base = effective_base_url(&self.base_url, key.apertus_key_config.as_ref());
        let path = self
            .custom_provider_config
            .as_ref()
            .and_then(|custom| custom.path_override(request_type))
            .unwrap_or_else(|| request_type.default_path());
        format!("{}{}", base, path)
    }

    /// Model name sent upstream when `key` is asked for `requested`
    pub fn outgoing_model(&self, key: &Key, requested: &str) -> String {
        effective_model_name(key.apertus_key_config.as_ref(), requested)
    }

    /// Policy check, then URL and model resolution
    fn prepare<R: ModelRequest>(
        &self,
        key: &Key,
        mut request: R,
        request_type: RequestType,
    ) -> Result<(RequestTarget, R), ProviderError> {
        self.policy.check_allowed(&self.identity, request_type)?;

        let model_requested = request.model().to_string();
        request.set_model(self.outgoing_model(key, &model_requested));

        let target = RequestTarget {
            url: self.request_url(key, request_type),
            api_key: key.value.clone(),
            provider: self.identity.clone(),
            request_type,
            model_requested,
            extra_headers: self.network_config.extra_headers.clone(),
            timeout: self.network_config.request_timeout(),
            retry: RetryConfig::from_retries(
                self.network_config.max_retries,
                self.network_config.retry_backoff_initial(),
                self.network_config.retry_backoff_max(),
            ),
            send_back_raw_response: self.send_back_raw_response,
        };

        debug!(
            provider = %self.identity,
            request_type = %request_type,
            url = %target.url,
            model = %request.model(),
            "resolved request target"
        );

        Ok((target, request))
    }

    fn stream_payload<R: serde::Serialize>(
        &self,
        request: &R,
        switch: (&str, Value),
    ) -> Result<Value, ProviderError> {
        let mut payload = serde_json::to_value(request)
            .map_err(|e| ProviderError::serialization(&self.identity, e.to_string()))?;
        if let Value::Object(map) = &mut payload {
            map.insert(switch.0.to_string(), switch.1);
        }
        Ok(payload)
    }

    /// List the models the given keys may serve.
    ///
    /// No upstream call is made: the listing is the union of the keys' model
    /// lists in first-seen order, reported under this provider's identity.
    pub fn list_models(&self, keys: &[Key]) -> Result<ListModelsResponse, ProviderError> {
        self.policy
            .check_allowed(&self.identity, RequestType::ListModels)?;

        let mut seen = HashSet::new();
        let data = keys
            .iter()
            .flat_map(|key| key.models.iter())
            .filter(|model| seen.insert(model.as_str()))
            .map(|model| ModelDescriptor::new(&self.identity, model))
            .collect();

        Ok(ListModelsResponse {
            data,
            extra_fields: ResponseExtraFields::new(
                self.identity.clone(),
                RequestType::ListModels,
                "",
            ),
        })
    }

    pub async fn text_completion(
        &self,
        key: &Key,
        request: TextCompletionRequest,
    ) -> Result<TextCompletionResponse, ProviderError> {
        let (target, request) = self.prepare(key, request, RequestType::TextCompletion)?;
        self.handler.json_request(&target, &request).await
    }

    pub async fn text_completion_stream(
        &self,
        key: &Key,
        request: TextCompletionRequest,
    ) -> Result<ProviderStream, ProviderError> {
        let (target, request) = self.prepare(key, request, RequestType::TextCompletionStream)?;
        let payload = self.stream_payload(&request, ("stream", Value::Bool(true)))?;
        self.handler.stream_request(&target, payload).await
    }

    pub async fn chat_completion(
        &self,
        key: &Key,
        request: ChatRequest,
    ) -> Result<ChatResponse, ProviderError> {
        let (target, request) = self.prepare(key, request, RequestType::ChatCompletion)?;
        self.handler.json_request(&target, &request).await
    }

    pub async fn chat_completion_stream(
        &self,
        key: &Key,
        request: ChatRequest,
    ) -> Result<ProviderStream, ProviderError> {
        let (target, request) = self.prepare(key, request, RequestType::ChatCompletionStream)?;
        let payload = self.stream_payload(&request, ("stream", Value::Bool(true)))?;
        self.handler.stream_request(&target, payload).await
    }

    pub async fn responses(
        &self,
        key: &Key,
        request: ResponsesRequest,
    ) -> Result<ResponsesResponse, ProviderError> {
        let (target, request) = self.prepare(key, request, RequestType::Responses)?;
        self.handler.json_request(&target, &request).await
    }

    pub async fn responses_stream(
        &self,
        key: &Key,
        request: ResponsesRequest,
    ) -> Result<ProviderStream, ProviderError> {
        let (target, request) = self.prepare(key, request, RequestType::ResponsesStream)?;
        let payload = self.stream_payload(&request, ("stream", Value::Bool(true)))?;
        self.handler.stream_request(&target, payload).await
    }

    /// Embeddings are blocking only
    pub async fn embedding(
        &self,
        key: &Key,
        request: EmbeddingRequest,
    ) -> Result<EmbeddingResponse, ProviderError> {
        let (target, request) = self.prepare(key, request, RequestType::Embedding)?;
        self.handler.json_request(&target, &request).await
    }

    pub async fn speech(
        &self,
        key: &Key,
        request: SpeechRequest,
    ) -> Result<SpeechResponse, ProviderError> {
        let (target, request) = self.prepare(key, request, RequestType::Speech)?;
        self.handler.speech_request(&target, &request).await
    }

    pub async fn speech_stream(
        &self,
        key: &Key,
        request: SpeechRequest,
    ) -> Result<ProviderStream, ProviderError> {
        let (target, request) = self.prepare(key, request, RequestType::SpeechStream)?;
        let payload =
            self.stream_payload(&request, ("stream_format", Value::String("sse".to_string())))?;
        self.handler.stream_request(&target, payload).await
    }

    pub async fn transcription(
        &self,
        key: &Key,
        request: TranscriptionRequest,
    ) -> Result<TranscriptionResponse, ProviderError> {
        let (target, request) = self.prepare(key, request, RequestType::Transcription)?;
        self.handler.transcription_request(&target, &request).await
    }

    pub async fn transcription_stream(
        &self,
        key: &Key,
        request: TranscriptionRequest,
    ) -> Result<ProviderStream, ProviderError> {
        let (target, request) = self.prepare(key, request, RequestType::TranscriptionStream)?;
        self.handler.transcription_stream(&target, &request).await
    }
}

/// Custom provider key when configured, otherwise the built-in name
pub fn provider_identity(custom_provider_config: Option<&CustomProviderConfig>) -> String {
    custom_provider_config
        .map(|custom| custom.custom_provider_key.as_str())
        .filter(|name| !name.is_empty())
        .unwrap_or(PROVIDER_NAME)
        .to_string()
}
