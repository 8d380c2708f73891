//! Apertus provider
//!
//! An OpenAI-compatible backend whose endpoint and model names can be
//! overridden per API key.

pub mod provider;
pub mod resolver;

pub use provider::{ApertusProvider, PROVIDER_NAME, provider_identity};
pub use resolver::{effective_base_url, effective_model_name, normalize_base_url};
