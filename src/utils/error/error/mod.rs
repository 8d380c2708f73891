//! Error handling for the gateway
//!
//! This module defines the crate-level error type and its conversions.

#![allow(missing_docs)]

mod conversions;
mod helpers;
mod types;

pub use types::{GatewayError, Result};
