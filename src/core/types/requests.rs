//! Request payloads for each shape
//!
//! Only the fields the gateway inspects are typed. Everything else passes
//! through untouched in `params` so new upstream parameters need no change here.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Requests that name the model they target
pub trait ModelRequest {
    fn model(&self) -> &str;

    /// Replace the outgoing model identifier
    fn set_model(&mut self, model: String);
}

macro_rules! json_request {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        pub struct $name {
            pub model: String,
            #[serde(flatten)]
            pub params: Map<String, Value>,
        }

        impl $name {
            pub fn new(model: impl Into<String>) -> Self {
                Self {
                    model: model.into(),
                    params: Map::new(),
                }
            }

            /// Set a pass-through parameter
            pub fn with_param(mut self, name: impl Into<String>, value: Value) -> Self {
                self.params.insert(name.into(), value);
                self
            }
        }

        impl ModelRequest for $name {
            fn model(&self) -> &str {
                &self.model
            }

            fn set_model(&mut self, model: String) {
                self.model = model;
            }
        }
    };
}

json_request!(
    /// Legacy text completion (`/v1/completions`)
    TextCompletionRequest
);
json_request!(
    /// Chat completion (`/v1/chat/completions`)
    ChatRequest
);
json_request!(
    /// Responses API (`/v1/responses`)
    ResponsesRequest
);
json_request!(
    /// Embeddings (`/v1/embeddings`)
    EmbeddingRequest
);
json_request!(
    /// Speech synthesis (`/v1/audio/speech`)
    SpeechRequest
);

/// Audio transcription, sent as a multipart upload
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranscriptionRequest {
    pub model: String,
    /// Raw audio bytes
    pub file: Vec<u8>,
    /// File name reported to the backend; its extension selects the MIME type
    pub filename: String,
    pub language: Option<String>,
    pub prompt: Option<String>,
    /// "json", "text", "srt", "verbose_json" or "vtt"
    pub response_format: Option<String>,
    pub temperature: Option<f32>,
    pub timestamp_granularities: Option<Vec<String>>,
}

impl TranscriptionRequest {
    pub fn new(model: impl Into<String>, file: Vec<u8>, filename: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            file,
            filename: filename.into(),
            ..Default::default()
        }
    }
}

impl ModelRequest for TranscriptionRequest {
    fn model(&self) -> &str {
        &self.model
    }

    fn set_model(&mut self, model: String) {
        self.model = model;
    }
}
