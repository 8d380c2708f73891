//! Error handling utilities
//!
//! Crate-level error type plus retry with exponential backoff.

pub mod error;
pub mod recovery;

pub use error::*;
pub use recovery::*;
