use sea_orm_migration::prelude::*;

mod m20250101_000001_create_config_providers_table;
mod m20250101_000002_create_config_keys_table;
mod m20250201_000001_add_apertus_model_name_mappings;

/// Database migrator for SeaORM
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_config_providers_table::Migration),
            Box::new(m20250101_000002_create_config_keys_table::Migration),
            Box::new(m20250201_000001_add_apertus_model_name_mappings::Migration),
        ]
    }
}
