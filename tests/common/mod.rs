//! Common test utilities for apertus-gateway
//!
//! - In-memory SQLite database support
//! - Key and provider fixtures
//! - Mock upstream helpers

pub mod database;
pub mod upstream;

// Re-export commonly used items
pub use database::TestDatabase;
pub use fixtures::{KeyFactory, ProviderFactory};

/// Assert that a result is Ok and return the value
#[macro_export]
macro_rules! assert_ok {
    ($expr:expr) => {
        match $expr {
            Ok(v) => v,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
}

/// Assert that a result is Err
#[macro_export]
macro_rules! assert_err {
    ($expr:expr) => {
        match $expr {
            Ok(v) => panic!("Expected Err, got Ok: {:?}", v),
            Err(e) => e,
        }
    };
}
