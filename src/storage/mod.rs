//! Storage layer
//!
//! Persists keys and provider configurations in a relational database.

/// Database storage module
pub mod database;

use crate::config::StorageConfig;
use crate::utils::error::Result;
use std::sync::Arc;
use tracing::{debug, info};

/// Storage layer wrapping the database connection
#[derive(Debug, Clone)]
pub struct StorageLayer {
    /// Database connection pool
    pub database: Arc<database::Database>,
}

impl StorageLayer {
    /// Connect and bring the schema up to date
    pub async fn new(config: &StorageConfig) -> Result<Self> {
        info!("Initializing storage layer");

        debug!("Connecting to database");
        let database = Arc::new(database::Database::new(&config.database).await?);
        database.migrate().await?;

        info!("Storage layer initialized successfully");
        Ok(Self { database })
    }

    /// Get database
    pub fn db(&self) -> &database::Database {
        &self.database
    }

    /// Health check for the database
    pub async fn health_check(&self) -> Result<()> {
        self.database.health_check().await
    }
}
