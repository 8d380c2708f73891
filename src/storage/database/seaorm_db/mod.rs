// Module declarations
mod connection;
mod key_ops;
mod provider_ops;
mod types;

// Re-export public types
pub use types::{DatabaseBackendType, SeaOrmDatabase};
