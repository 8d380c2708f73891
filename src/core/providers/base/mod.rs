//! Module
//!
//! Contains base components shared by all providers

pub mod connection_pool;
pub mod policy;
pub mod sse;

pub use connection_pool::{ConnectionPool, PoolConfig};
pub use policy::{ConfigOperationPolicy, OperationPolicy};
pub use sse::{
    OpenAICompatibleTransformer, ParsedBatch, SSEEvent, SSETransformer, UnifiedSSEParser,
    UnifiedSSEStream,
};
