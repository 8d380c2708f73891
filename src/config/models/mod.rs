//! Configuration data models
//!
//! This module defines all configuration structures used by the gateway.

#![allow(missing_docs)]

pub mod logging;
pub mod provider;
pub mod storage;

pub use logging::*;
pub use provider::*;
pub use storage::*;

/// Default timeout in seconds
pub fn default_timeout() -> u64 {
    30
}

/// Default maximum database connections
pub fn default_max_connections() -> u32 {
    5
}

/// Default connection timeout in seconds
pub fn default_connection_timeout() -> u64 {
    5
}
