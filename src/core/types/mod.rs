//! Core domain types

pub mod key;
pub mod request_type;
pub mod requests;
pub mod responses;

pub use key::{
    ApertusKeyConfig, AzureKeyConfig, BedrockKeyConfig, Key, KeyOverrideKind, VertexKeyConfig,
};
pub use request_type::RequestType;
pub use requests::{
    ChatRequest, EmbeddingRequest, ModelRequest, ResponsesRequest, SpeechRequest,
    TextCompletionRequest, TranscriptionRequest,
};
pub use responses::{
    ChatResponse, EmbeddingResponse, ListModelsResponse, ModelDescriptor, ProviderResponse,
    ResponseExtraFields, ResponsesResponse, SpeechResponse, StreamChunk, TextCompletionResponse,
    TranscriptionResponse,
};
