//! Adds the Apertus model name mapping column to existing key tables

use sea_orm_migration::prelude::*;

use super::m20250101_000002_create_config_keys_table::ConfigKeys;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum ApertusColumns {
    ApertusModelNameMappingsJson,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        if manager
            .has_column("config_keys", "apertus_model_name_mappings_json")
            .await?
        {
            return Ok(());
        }

        manager
            .alter_table(
                Table::alter()
                    .table(ConfigKeys::Table)
                    .add_column(
                        ColumnDef::new(ApertusColumns::ApertusModelNameMappingsJson)
                            .text()
                            .null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(ConfigKeys::Table)
                    .drop_column(ApertusColumns::ApertusModelNameMappingsJson)
                    .to_owned(),
            )
            .await
    }
}
