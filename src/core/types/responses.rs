//! Responses returned by the dispatcher

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::request_type::RequestType;

/// Metadata attached to every response and stream chunk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseExtraFields {
    /// Identity of the provider that served the call
    pub provider: String,
    pub request_type: RequestType,
    /// Model name the caller asked for, before any mapping
    #[serde(default)]
    pub model_requested: String,
    /// Wall-clock latency in milliseconds
    pub latency: u64,
    /// Upstream payload, present when raw echo is enabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<Value>,
    /// Position of a stream chunk, starting at 0
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_index: Option<u64>,
}

impl ResponseExtraFields {
    pub fn new(
        provider: impl Into<String>,
        request_type: RequestType,
        model_requested: impl Into<String>,
    ) -> Self {
        Self {
            provider: provider.into(),
            request_type,
            model_requested: model_requested.into(),
            latency: 0,
            raw_response: None,
            chunk_index: None,
        }
    }
}

/// JSON response for completion, chat, responses and embedding calls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderResponse {
    /// Upstream body, unchanged
    pub body: Value,
    pub extra_fields: ResponseExtraFields,
}

impl ProviderResponse {
    /// Model reported by the backend
    pub fn model(&self) -> Option<&str> {
        self.body.get("model").and_then(Value::as_str)
    }

    pub fn id(&self) -> Option<&str> {
        self.body.get("id").and_then(Value::as_str)
    }
}

pub type TextCompletionResponse = ProviderResponse;
pub type ChatResponse = ProviderResponse;
pub type ResponsesResponse = ProviderResponse;
pub type EmbeddingResponse = ProviderResponse;

/// Synthesized audio
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechResponse {
    pub audio: Bytes,
    pub content_type: Option<String>,
    pub extra_fields: ResponseExtraFields,
}

/// Transcribed audio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptionResponse {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    /// Full upstream body; plain-text formats are wrapped as `{"text": ...}`
    pub body: Value,
    pub extra_fields: ResponseExtraFields,
}

/// One event of a streaming response
#[derive(Debug, Clone, PartialEq)]
pub struct StreamChunk {
    /// Decoded `data:` payload
    pub data: Value,
    /// Decoded audio for speech stream deltas
    pub audio: Option<Bytes>,
    pub extra_fields: ResponseExtraFields,
}

impl StreamChunk {
    /// Text delta carried by the chunk, whatever the request shape
    pub fn text_delta(&self) -> Option<&str> {
        if let Some(choice) = self.data.get("choices").and_then(|c| c.get(0)) {
            if let Some(content) = choice
                .get("delta")
                .and_then(|d| d.get("content"))
                .and_then(Value::as_str)
            {
                return Some(content);
            }
            if let Some(text) = choice.get("text").and_then(Value::as_str) {
                return Some(text);
            }
        }
        self.data.get("delta").and_then(Value::as_str)
    }
}

/// One entry of a model listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    /// `<provider>/<model>`
    pub id: String,
    pub object: String,
    pub owned_by: String,
}

impl ModelDescriptor {
    pub fn new(provider: &str, model: &str) -> Self {
        Self {
            id: format!("{}/{}", provider, model),
            object: "model".to_string(),
            owned_by: "system".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListModelsResponse {
    pub data: Vec<ModelDescriptor>,
    pub extra_fields: ResponseExtraFields,
}
