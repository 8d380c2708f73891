use crate::config::ProviderConfig;
use crate::utils::error::{GatewayError, Result};
use sea_orm::*;
use tracing::debug;

use super::super::entities::{self, config_provider};
use super::types::SeaOrmDatabase;

impl SeaOrmDatabase {
    /// Insert or replace a provider row
    pub async fn upsert_provider(&self, name: &str, config: &ProviderConfig) -> Result<()> {
        debug!("Upserting provider: {}", name);

        let row = config_provider::Model::from_domain_provider(name, config)?;
        let existing = entities::ConfigProvider::find()
            .filter(config_provider::Column::Name.eq(name))
            .one(&self.db)
            .await
            .map_err(GatewayError::Database)?;

        match existing {
            Some(existing) => {
                let mut active: config_provider::ActiveModel = existing.into();
                row.apply_to(&mut active);
                active.update(&self.db).await.map_err(GatewayError::Database)?;
            }
            None => {
                let mut active: config_provider::ActiveModel = row.into();
                active.id = NotSet;
                entities::ConfigProvider::insert(active)
                    .exec(&self.db)
                    .await
                    .map_err(GatewayError::Database)?;
            }
        }

        Ok(())
    }

    /// Find provider configuration by name
    pub async fn find_provider_by_name(&self, name: &str) -> Result<Option<ProviderConfig>> {
        debug!("Finding provider by name: {}", name);

        entities::ConfigProvider::find()
            .filter(config_provider::Column::Name.eq(name))
            .one(&self.db)
            .await
            .map_err(GatewayError::Database)?
            .map(|row| row.to_domain_provider())
            .transpose()
    }
}
