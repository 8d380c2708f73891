/// Key entity module
pub mod config_key;
/// Provider entity module
pub mod config_provider;

pub use config_key::Entity as ConfigKey;
pub use config_provider::Entity as ConfigProvider;
