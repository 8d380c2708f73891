//! Provider row entity

use sea_orm::Set;
use sea_orm::entity::prelude::*;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::ProviderConfig;
use crate::utils::error::GatewayError;

/// Provider database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "config_providers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Provider name, the custom provider key for custom providers
    #[sea_orm(unique)]
    pub name: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub network_config_json: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub concurrency_buffer_json: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub proxy_config_json: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub custom_provider_config_json: Option<String>,

    pub send_back_raw_response: bool,

    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::config_key::Entity")]
    Keys,
}

impl Related<super::config_key::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Keys.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

fn decode_column<T: DeserializeOwned>(
    column: &str,
    text: Option<&str>,
) -> std::result::Result<Option<T>, GatewayError> {
    match text {
        None | Some("") => Ok(None),
        Some(text) => serde_json::from_str(text).map(Some).map_err(|e| {
            warn!(column, "malformed JSON in provider row: {}", e);
            GatewayError::Serialization(e)
        }),
    }
}

impl Model {
    /// Encode a provider configuration into a row
    pub fn from_domain_provider(
        name: &str,
        config: &ProviderConfig,
    ) -> std::result::Result<Self, GatewayError> {
        if let Some(custom) = &config.custom_provider_config {
            if custom.base_provider_type.is_empty() {
                return Err(GatewayError::validation(format!(
                    "provider '{}': base_provider_type is required for custom providers",
                    name
                )));
            }
        }

        let now: DateTimeWithTimeZone = chrono::Utc::now().into();
        Ok(Self {
            id: 0,
            name: name.to_string(),
            network_config_json: Some(serde_json::to_string(&config.network_config)?),
            concurrency_buffer_json: Some(serde_json::to_string(
                &config.concurrency_and_buffer_size,
            )?),
            proxy_config_json: config
                .proxy_config
                .as_ref()
                .map(serde_json::to_string)
                .transpose()?,
            custom_provider_config_json: config
                .custom_provider_config
                .as_ref()
                .map(serde_json::to_string)
                .transpose()?,
            send_back_raw_response: config.send_back_raw_response,
            created_at: now,
            updated_at: now,
        })
    }

    /// Decode a row into a provider configuration
    pub fn to_domain_provider(&self) -> std::result::Result<ProviderConfig, GatewayError> {
        Ok(ProviderConfig {
            network_config: decode_column("network_config_json", self.network_config_json.as_deref())?
                .unwrap_or_default(),
            concurrency_and_buffer_size: decode_column(
                "concurrency_buffer_json",
                self.concurrency_buffer_json.as_deref(),
            )?
            .unwrap_or_default(),
            proxy_config: decode_column("proxy_config_json", self.proxy_config_json.as_deref())?,
            send_back_raw_response: self.send_back_raw_response,
            custom_provider_config: decode_column(
                "custom_provider_config_json",
                self.custom_provider_config_json.as_deref(),
            )?,
        })
    }

    /// Built-in provider type the row's keys are validated against
    pub fn base_provider_type(&self) -> std::result::Result<String, GatewayError> {
        let config = self.to_domain_provider()?;
        Ok(config
            .custom_provider_config
            .map(|custom| custom.base_provider_type)
            .unwrap_or_else(|| self.name.clone()))
    }

    /// Copy every encoded column except identity and creation time onto
    /// `active`
    pub fn apply_to(self, active: &mut ActiveModel) {
        active.network_config_json = Set(self.network_config_json);
        active.concurrency_buffer_json = Set(self.concurrency_buffer_json);
        active.proxy_config_json = Set(self.proxy_config_json);
        active.custom_provider_config_json = Set(self.custom_provider_config_json);
        active.send_back_raw_response = Set(self.send_back_raw_response);
        active.updated_at = Set(self.updated_at);
    }
}
