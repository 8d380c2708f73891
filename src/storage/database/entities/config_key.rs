//! Key row entity and the flat-row codec
//!
//! Override values are stored as flat nullable columns, one group per
//! override kind. Map-valued sub-fields are JSON object text.

use sea_orm::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

use crate::core::types::{
    ApertusKeyConfig, AzureKeyConfig, BedrockKeyConfig, Key, VertexKeyConfig,
};
use crate::utils::error::GatewayError;

/// Key database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "config_keys")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub name: String,

    /// Owning provider row
    pub provider_id: i32,

    pub provider: String,

    /// Stable key identifier
    #[sea_orm(unique)]
    pub key_id: String,

    /// Secret credential
    #[sea_orm(column_type = "Text")]
    pub value: String,

    /// JSON list of allowed models
    #[sea_orm(column_type = "Text")]
    pub models_json: String,

    pub weight: f64,

    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,

    // Azure
    #[sea_orm(column_type = "Text", nullable)]
    pub azure_endpoint: Option<String>,
    pub azure_api_version: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub azure_deployments_json: Option<String>,

    // Vertex
    pub vertex_project_id: Option<String>,
    pub vertex_region: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub vertex_auth_credentials: Option<String>,

    // Bedrock
    #[sea_orm(column_type = "Text", nullable)]
    pub bedrock_access_key: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub bedrock_secret_key: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub bedrock_session_token: Option<String>,
    pub bedrock_region: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub bedrock_arn: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub bedrock_deployments_json: Option<String>,

    // Apertus
    #[sea_orm(column_type = "Text", nullable)]
    pub apertus_endpoint: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub apertus_model_name_mappings_json: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::config_provider::Entity",
        from = "Column::ProviderId",
        to = "super::config_provider::Column::Id",
        on_delete = "Cascade"
    )]
    Provider,
}

impl Related<super::config_provider::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Provider.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn opt_non_empty(value: Option<&String>) -> Option<String> {
    value.map(String::as_str).and_then(non_empty)
}

fn encode_map(
    map: Option<&BTreeMap<String, String>>,
) -> std::result::Result<Option<String>, GatewayError> {
    match map {
        Some(map) if !map.is_empty() => Ok(Some(serde_json::to_string(map)?)),
        _ => Ok(None),
    }
}

fn decode_map(
    column: &str,
    text: Option<&str>,
) -> std::result::Result<Option<BTreeMap<String, String>>, GatewayError> {
    match text {
        None | Some("") => Ok(None),
        Some(text) => serde_json::from_str(text).map(Some).map_err(|e| {
            warn!(column, "malformed JSON in key row: {}", e);
            GatewayError::Serialization(e)
        }),
    }
}

fn any_set(columns: &[&Option<String>]) -> bool {
    columns.iter().any(|c| c.is_some())
}

impl Model {
    /// Encode a domain key into a row.
    ///
    /// The key is validated first; a key violating its invariants is never
    /// written. The row id is left at 0 for the database to assign.
    pub fn from_domain_key(
        key: &Key,
        provider_id: i32,
    ) -> std::result::Result<Self, GatewayError> {
        key.validate().map_err(GatewayError::Validation)?;

        let now: DateTimeWithTimeZone = chrono::Utc::now().into();
        let mut row = Self {
            id: 0,
            name: key.name.clone(),
            provider_id,
            provider: key.provider.clone(),
            key_id: key.id.clone(),
            value: key.value.clone(),
            models_json: serde_json::to_string(&key.models)?,
            weight: key.weight,
            created_at: now,
            updated_at: now,
            azure_endpoint: None,
            azure_api_version: None,
            azure_deployments_json: None,
            vertex_project_id: None,
            vertex_region: None,
            vertex_auth_credentials: None,
            bedrock_access_key: None,
            bedrock_secret_key: None,
            bedrock_session_token: None,
            bedrock_region: None,
            bedrock_arn: None,
            bedrock_deployments_json: None,
            apertus_endpoint: None,
            apertus_model_name_mappings_json: None,
        };

        if let Some(azure) = &key.azure_key_config {
            row.azure_endpoint = non_empty(&azure.endpoint);
            row.azure_api_version = opt_non_empty(azure.api_version.as_ref());
            row.azure_deployments_json = encode_map(azure.deployments.as_ref())?;
        }

        if let Some(vertex) = &key.vertex_key_config {
            row.vertex_project_id = non_empty(&vertex.project_id);
            row.vertex_region = non_empty(&vertex.region);
            row.vertex_auth_credentials = non_empty(&vertex.auth_credentials);
        }

        if let Some(bedrock) = &key.bedrock_key_config {
            row.bedrock_access_key = non_empty(&bedrock.access_key);
            row.bedrock_secret_key = non_empty(&bedrock.secret_key);
            row.bedrock_session_token = opt_non_empty(bedrock.session_token.as_ref());
            row.bedrock_region = opt_non_empty(bedrock.region.as_ref());
            row.bedrock_arn = opt_non_empty(bedrock.arn.as_ref());
            row.bedrock_deployments_json = encode_map(bedrock.deployments.as_ref())?;
        }

        if let Some(apertus) = &key.apertus_key_config {
            row.apertus_endpoint = non_empty(apertus.endpoint());
            row.apertus_model_name_mappings_json = encode_map(apertus.model_name_mappings())?;
        }

        Ok(row)
    }

    /// Decode a row into a domain key.
    ///
    /// Each override group is rebuilt only when at least one of its columns is
    /// set. Malformed JSON fails the whole read.
    pub fn to_domain_key(&self) -> std::result::Result<Key, GatewayError> {
        let models = match self.models_json.trim() {
            "" => Vec::new(),
            text => serde_json::from_str(text).map_err(|e| {
                warn!(key_id = %self.key_id, "malformed models_json: {}", e);
                GatewayError::Serialization(e)
            })?,
        };

        let azure_key_config = if any_set(&[
            &self.azure_endpoint,
            &self.azure_api_version,
            &self.azure_deployments_json,
        ]) {
            Some(AzureKeyConfig {
                endpoint: self.azure_endpoint.clone().unwrap_or_default(),
                api_version: self.azure_api_version.clone(),
                deployments: decode_map(
                    "azure_deployments_json",
                    self.azure_deployments_json.as_deref(),
                )?,
            })
        } else {
            None
        };

        let vertex_key_config = if any_set(&[
            &self.vertex_project_id,
            &self.vertex_region,
            &self.vertex_auth_credentials,
        ]) {
            Some(VertexKeyConfig {
                project_id: self.vertex_project_id.clone().unwrap_or_default(),
                region: self.vertex_region.clone().unwrap_or_default(),
                auth_credentials: self.vertex_auth_credentials.clone().unwrap_or_default(),
            })
        } else {
            None
        };

        let bedrock_key_config = if any_set(&[
            &self.bedrock_access_key,
            &self.bedrock_secret_key,
            &self.bedrock_session_token,
            &self.bedrock_region,
            &self.bedrock_arn,
            &self.bedrock_deployments_json,
        ]) {
            Some(BedrockKeyConfig {
                access_key: self.bedrock_access_key.clone().unwrap_or_default(),
                secret_key: self.bedrock_secret_key.clone().unwrap_or_default(),
                session_token: self.bedrock_session_token.clone(),
                region: self.bedrock_region.clone(),
                arn: self.bedrock_arn.clone(),
                deployments: decode_map(
                    "bedrock_deployments_json",
                    self.bedrock_deployments_json.as_deref(),
                )?,
            })
        } else {
            None
        };

        let apertus_key_config = if any_set(&[
            &self.apertus_endpoint,
            &self.apertus_model_name_mappings_json,
        ]) {
            Some(ApertusKeyConfig::new(
                self.apertus_endpoint.clone().unwrap_or_default(),
                decode_map(
                    "apertus_model_name_mappings_json",
                    self.apertus_model_name_mappings_json.as_deref(),
                )?,
            ))
        } else {
            None
        };

        Ok(Key {
            id: self.key_id.clone(),
            name: self.name.clone(),
            provider: self.provider.clone(),
            value: self.value.clone(),
            models,
            weight: self.weight,
            azure_key_config,
            vertex_key_config,
            bedrock_key_config,
            apertus_key_config,
        })
    }

    /// Active model for insertion, leaving the row id to the database
    pub fn into_insert_model(self) -> ActiveModel {
        let mut active: ActiveModel = self.into();
        active.id = sea_orm::ActiveValue::NotSet;
        active
    }

    /// Copy every encoded column except identity and creation time onto
    /// `active`
    pub fn apply_to(self, active: &mut ActiveModel) {
        active.name = Set(self.name);
        active.provider_id = Set(self.provider_id);
        active.provider = Set(self.provider);
        active.value = Set(self.value);
        active.models_json = Set(self.models_json);
        active.weight = Set(self.weight);
        active.updated_at = Set(self.updated_at);
        active.azure_endpoint = Set(self.azure_endpoint);
        active.azure_api_version = Set(self.azure_api_version);
        active.azure_deployments_json = Set(self.azure_deployments_json);
        active.vertex_project_id = Set(self.vertex_project_id);
        active.vertex_region = Set(self.vertex_region);
        active.vertex_auth_credentials = Set(self.vertex_auth_credentials);
        active.bedrock_access_key = Set(self.bedrock_access_key);
        active.bedrock_secret_key = Set(self.bedrock_secret_key);
        active.bedrock_session_token = Set(self.bedrock_session_token);
        active.bedrock_region = Set(self.bedrock_region);
        active.bedrock_arn = Set(self.bedrock_arn);
        active.bedrock_deployments_json = Set(self.bedrock_deployments_json);
        active.apertus_endpoint = Set(self.apertus_endpoint);
        active.apertus_model_name_mappings_json = Set(self.apertus_model_name_mappings_json);
    }
}
