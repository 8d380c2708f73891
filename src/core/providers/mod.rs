//! Provider implementations
//!
//! `base` holds the transport pieces shared by every OpenAI-compatible
//! backend, `openai_compatible` the request handler built on them, and
//! `apertus` the provider that resolves targets and models per key.

pub mod apertus;
pub mod base;
pub mod openai_compatible;
pub mod unified_provider;

pub use apertus::ApertusProvider;
pub use unified_provider::ProviderError;
