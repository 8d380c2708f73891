//! # apertus-gateway
//!
//! Core of an OpenAI-compatible "Apertus" provider.
//!
//! Each API key may carry its own endpoint and a table renaming public model
//! names to backend deployment names. The provider resolves both per call,
//! dispatches every OpenAI request shape (text, chat, responses, embeddings,
//! speech, transcription; blocking and streaming) and lists the models its
//! keys serve without touching the network.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use apertus_gateway::{ApertusProvider, ChatRequest, Key, ApertusKeyConfig, ProviderConfig};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = ApertusProvider::new(ProviderConfig::default())?;
//!     let key = Key::new("primary", "apertus", std::env::var("APERTUS_API_KEY")?)
//!         .with_apertus_config(ApertusKeyConfig::with_mappings([("gpt-4o", "prod-deploy-1")]));
//!
//!     let request = ChatRequest::new("gpt-4o")
//!         .with_param("messages", json!([{ "role": "user", "content": "Hello" }]));
//!     let response = provider.chat_completion(&key, request).await?;
//!     println!("{}", response.body);
//!     Ok(())
//! }
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod config;
pub mod core;
pub mod storage;
pub mod utils;

// Re-export main types
pub use config::{Config, CustomProviderConfig, NetworkConfig, ProviderConfig};
pub use core::providers::apertus::{ApertusProvider, PROVIDER_NAME};
pub use core::providers::base::{ConfigOperationPolicy, OperationPolicy};
pub use core::providers::openai_compatible::ProviderStream;
pub use core::providers::unified_provider::ProviderError;
pub use core::types::{
    ApertusKeyConfig, ChatRequest, ChatResponse, EmbeddingRequest, EmbeddingResponse, Key,
    ListModelsResponse, RequestType, ResponsesRequest, SpeechRequest, SpeechResponse,
    StreamChunk, TextCompletionRequest, TranscriptionRequest, TranscriptionResponse,
};
pub use storage::StorageLayer;
pub use utils::error::{GatewayError, Result};

// Version information
/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
/// Description of the crate
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
