//! API keys and their per-provider override values

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Which provider family an override value belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyOverrideKind {
    Azure,
    Vertex,
    Bedrock,
    Apertus,
}

impl KeyOverrideKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyOverrideKind::Azure => "azure",
            KeyOverrideKind::Vertex => "vertex",
            KeyOverrideKind::Bedrock => "bedrock",
            KeyOverrideKind::Apertus => "apertus",
        }
    }
}

impl fmt::Display for KeyOverrideKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-key override for the Apertus provider.
///
/// The value is immutable once built; replace it to change it. An empty
/// mapping table is the same as no table at all, so the constructor and
/// deserializer both collapse `Some({})` to `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawApertusKeyConfig")]
pub struct ApertusKeyConfig {
    endpoint: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    model_name_mappings: Option<BTreeMap<String, String>>,
}

#[derive(Deserialize)]
struct RawApertusKeyConfig {
    #[serde(default)]
    endpoint: String,
    #[serde(default)]
    model_name_mappings: Option<BTreeMap<String, String>>,
}

impl From<RawApertusKeyConfig> for ApertusKeyConfig {
    fn from(raw: RawApertusKeyConfig) -> Self {
        Self::new(raw.endpoint, raw.model_name_mappings)
    }
}

impl ApertusKeyConfig {
    pub fn new(
        endpoint: impl Into<String>,
        model_name_mappings: Option<BTreeMap<String, String>>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            model_name_mappings: model_name_mappings.filter(|m| !m.is_empty()),
        }
    }

    /// Override carrying only an endpoint
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self::new(endpoint, None)
    }

    /// Override carrying only model mappings
    pub fn with_mappings<I, K, V>(mappings: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mappings = mappings
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self::new("", Some(mappings))
    }

    /// Endpoint, empty when the provider default applies
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn model_name_mappings(&self) -> Option<&BTreeMap<String, String>> {
        self.model_name_mappings.as_ref()
    }

    /// Backend name for `model`, if one is configured
    pub fn mapped_model(&self, model: &str) -> Option<&str> {
        self.model_name_mappings
            .as_ref()
            .and_then(|m| m.get(model))
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.endpoint.is_empty() && self.model_name_mappings.is_none()
    }
}

/// Per-key override for Azure OpenAI deployments
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AzureKeyConfig {
    #[serde(default)]
    pub endpoint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployments: Option<BTreeMap<String, String>>,
}

impl AzureKeyConfig {
    pub fn is_empty(&self) -> bool {
        self.endpoint.is_empty()
            && blank(self.api_version.as_deref())
            && self.deployments.as_ref().is_none_or(BTreeMap::is_empty)
    }
}

/// Per-key override for Vertex AI
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VertexKeyConfig {
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub auth_credentials: String,
}

impl VertexKeyConfig {
    pub fn is_empty(&self) -> bool {
        self.project_id.is_empty() && self.region.is_empty() && self.auth_credentials.is_empty()
    }
}

/// Per-key override for AWS Bedrock
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BedrockKeyConfig {
    #[serde(default)]
    pub access_key: String,
    #[serde(default)]
    pub secret_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployments: Option<BTreeMap<String, String>>,
}

impl BedrockKeyConfig {
    pub fn is_empty(&self) -> bool {
        self.access_key.is_empty()
            && self.secret_key.is_empty()
            && blank(self.session_token.as_deref())
            && blank(self.region.as_deref())
            && blank(self.arn.as_deref())
            && self.deployments.as_ref().is_none_or(BTreeMap::is_empty)
    }
}

fn blank(value: Option<&str>) -> bool {
    value.is_none_or(str::is_empty)
}

/// One credential scoped to exactly one provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Key {
    /// Stable identifier
    pub id: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Owning provider
    #[serde(default)]
    pub provider: String,
    /// Secret credential
    pub value: String,
    /// Models this key may serve; empty means any model
    #[serde(default)]
    pub models: Vec<String>,
    #[serde(default = "default_key_weight")]
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azure_key_config: Option<AzureKeyConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertex_key_config: Option<VertexKeyConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bedrock_key_config: Option<BedrockKeyConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apertus_key_config: Option<ApertusKeyConfig>,
}

fn default_key_weight() -> f64 {
    1.0
}

impl Key {
    /// Create a key with a fresh identifier and no override
    pub fn new(
        name: impl Into<String>,
        provider: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            provider: provider.into(),
            value: value.into(),
            models: Vec::new(),
            weight: default_key_weight(),
            azure_key_config: None,
            vertex_key_config: None,
            bedrock_key_config: None,
            apertus_key_config: None,
        }
    }

    pub fn with_models<I, S>(mut self, models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.models = models.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_apertus_config(mut self, config: ApertusKeyConfig) -> Self {
        self.apertus_key_config = Some(config);
        self
    }

    /// Kinds of non-empty override values; an empty one is stored as no
    /// override at all
    pub fn override_kinds(&self) -> Vec<KeyOverrideKind> {
        let mut kinds = Vec::new();
        if self.azure_key_config.as_ref().is_some_and(|c| !c.is_empty()) {
            kinds.push(KeyOverrideKind::Azure);
        }
        if self.vertex_key_config.as_ref().is_some_and(|c| !c.is_empty()) {
            kinds.push(KeyOverrideKind::Vertex);
        }
        if self.bedrock_key_config.as_ref().is_some_and(|c| !c.is_empty()) {
            kinds.push(KeyOverrideKind::Bedrock);
        }
        if self.apertus_key_config.as_ref().is_some_and(|c| !c.is_empty()) {
            kinds.push(KeyOverrideKind::Apertus);
        }
        kinds
    }

    /// Check the structural invariants of a key.
    ///
    /// At most one non-empty override value may be present and the weight
    /// must lie in (0, 1].
    pub fn validate(&self) -> Result<(), String> {
        if self.id.is_empty() {
            return Err("key id must not be empty".to_string());
        }
        if !(self.weight > 0.0 && self.weight <= 1.0) {
            return Err(format!(
                "key '{}' weight {} is outside (0, 1]",
                self.id, self.weight
            ));
        }
        let kinds = self.override_kinds();
        if kinds.len() > 1 {
            let names: Vec<&str> = kinds.iter().map(KeyOverrideKind::as_str).collect();
            return Err(format!(
                "key '{}' carries more than one override value: {}",
                self.id,
                names.join(", ")
            ));
        }
        Ok(())
    }

    /// Check that a present override value belongs to `base_provider`
    pub fn validate_for_provider(&self, base_provider: &str) -> Result<(), String> {
        self.validate()?;
        if let Some(kind) = self.override_kinds().first() {
            if kind.as_str() != base_provider {
                return Err(format!(
                    "key '{}' carries a {} override but belongs to provider '{}'",
                    self.id, kind, base_provider
                ));
            }
        }
        Ok(())
    }
}
