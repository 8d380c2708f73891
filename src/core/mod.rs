//! Core functionality
//!
//! Domain types and the provider implementations that dispatch them.

pub mod providers;
pub mod types;
