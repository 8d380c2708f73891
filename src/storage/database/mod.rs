//! Database storage implementation using SeaORM
//!
//! Keys and providers are persisted as flat rows; the entity modules own the
//! conversion to and from the domain types.

/// Database entities module
pub mod entities;
/// Database migration module
pub mod migration;
/// SeaORM database implementation module
pub mod seaorm_db;

// Re-export the main database interface
pub use seaorm_db::SeaOrmDatabase as Database;
pub use seaorm_db::DatabaseBackendType;
