use crate::core::types::Key;
use crate::utils::error::{GatewayError, Result};
use sea_orm::*;
use tracing::debug;

use super::super::entities::{self, config_key, config_provider};
use super::types::SeaOrmDatabase;

impl SeaOrmDatabase {
    /// Provider row owning `key`, with the key checked against its base type
    async fn owning_provider(&self, key: &Key) -> Result<config_provider::Model> {
        let provider = entities::ConfigProvider::find()
            .filter(config_provider::Column::Name.eq(key.provider.as_str()))
            .one(&self.db)
            .await
            .map_err(GatewayError::Database)?
            .ok_or_else(|| {
                GatewayError::not_found(format!("provider '{}' not found", key.provider))
            })?;

        key.validate_for_provider(&provider.base_provider_type()?)
            .map_err(GatewayError::Validation)?;
        Ok(provider)
    }

    async fn find_key_row(&self, key_id: &str) -> Result<Option<config_key::Model>> {
        entities::ConfigKey::find()
            .filter(config_key::Column::KeyId.eq(key_id))
            .one(&self.db)
            .await
            .map_err(GatewayError::Database)
    }

    /// Create a new key
    pub async fn create_key(&self, key: &Key) -> Result<Key> {
        debug!("Creating key: {} ({})", key.id, key.provider);

        let provider = self.owning_provider(key).await?;
        if self.find_key_row(&key.id).await?.is_some() {
            return Err(GatewayError::conflict(format!("key '{}' already exists", key.id)));
        }

        let row = config_key::Model::from_domain_key(key, provider.id)?;
        entities::ConfigKey::insert(row.into_insert_model())
            .exec(&self.db)
            .await
            .map_err(GatewayError::Database)?;

        Ok(key.clone())
    }

    /// Replace every stored field of an existing key
    pub async fn update_key(&self, key: &Key) -> Result<Key> {
        debug!("Updating key: {}", key.id);

        let existing = self
            .find_key_row(&key.id)
            .await?
            .ok_or_else(|| GatewayError::not_found(format!("key '{}' not found", key.id)))?;
        let provider = self.owning_provider(key).await?;

        let row = config_key::Model::from_domain_key(key, provider.id)?;
        let mut active: config_key::ActiveModel = existing.into();
        row.apply_to(&mut active);
        active.update(&self.db).await.map_err(GatewayError::Database)?;

        Ok(key.clone())
    }

    /// Find key by its stable identifier
    pub async fn find_key_by_key_id(&self, key_id: &str) -> Result<Option<Key>> {
        debug!("Finding key by ID: {}", key_id);

        self.find_key_row(key_id)
            .await?
            .map(|row| row.to_domain_key())
            .transpose()
    }

    /// List keys of a provider in insertion order
    pub async fn list_keys_by_provider(&self, provider: &str) -> Result<Vec<Key>> {
        debug!("Listing keys for provider: {}", provider);

        entities::ConfigKey::find()
            .filter(config_key::Column::Provider.eq(provider))
            .order_by_asc(config_key::Column::Id)
            .all(&self.db)
            .await
            .map_err(GatewayError::Database)?
            .iter()
            .map(config_key::Model::to_domain_key)
            .collect()
    }

    /// Delete a key
    pub async fn delete_key(&self, key_id: &str) -> Result<()> {
        debug!("Deleting key: {}", key_id);

        let result = entities::ConfigKey::delete_many()
            .filter(config_key::Column::KeyId.eq(key_id))
            .exec(&self.db)
            .await
            .map_err(GatewayError::Database)?;

        if result.rows_affected == 0 {
            return Err(GatewayError::not_found(format!("key '{}' not found", key_id)));
        }
        Ok(())
    }
}
