//! Integration tests for apertus-gateway
//!
//! These tests drive the public API against a real in-memory database and a
//! mock upstream server.

pub mod dispatch_tests;
pub mod key_store_tests;
pub mod provider_store_tests;
pub mod streaming_tests;
