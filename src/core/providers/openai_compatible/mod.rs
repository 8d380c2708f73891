//! Shared OpenAI-compatible request handling
//!
//! Used by providers that speak the OpenAI wire format. The delegating
//! provider passes its own identity in every [`RequestTarget`].

pub mod error;
pub mod handler;
pub mod multipart;

pub use error::OpenAIErrorMapper;
pub use handler::{OpenAICompatibleHandler, ProviderStream, RequestTarget};
