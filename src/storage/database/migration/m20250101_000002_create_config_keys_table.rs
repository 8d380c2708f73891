use sea_orm_migration::prelude::*;

use super::m20250101_000001_create_config_providers_table::ConfigProviders;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ConfigKeys::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ConfigKeys::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ConfigKeys::Name)
                            .string_len(255)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(ConfigKeys::ProviderId).integer().not_null())
                    .col(ColumnDef::new(ConfigKeys::Provider).string_len(50).not_null())
                    .col(
                        ColumnDef::new(ConfigKeys::KeyId)
                            .string_len(255)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(ConfigKeys::Value).text().not_null())
                    .col(
                        ColumnDef::new(ConfigKeys::ModelsJson)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .col(
                        ColumnDef::new(ConfigKeys::Weight)
                            .double()
                            .not_null()
                            .default(1.0),
                    )
                    .col(
                        ColumnDef::new(ConfigKeys::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(ConfigKeys::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(ConfigKeys::AzureEndpoint).text().null())
                    .col(ColumnDef::new(ConfigKeys::AzureApiVersion).string().null())
                    .col(ColumnDef::new(ConfigKeys::AzureDeploymentsJson).text().null())
                    .col(ColumnDef::new(ConfigKeys::VertexProjectId).string().null())
                    .col(ColumnDef::new(ConfigKeys::VertexRegion).string().null())
                    .col(ColumnDef::new(ConfigKeys::VertexAuthCredentials).text().null())
                    .col(ColumnDef::new(ConfigKeys::BedrockAccessKey).text().null())
                    .col(ColumnDef::new(ConfigKeys::BedrockSecretKey).text().null())
                    .col(ColumnDef::new(ConfigKeys::BedrockSessionToken).text().null())
                    .col(ColumnDef::new(ConfigKeys::BedrockRegion).string().null())
                    .col(ColumnDef::new(ConfigKeys::BedrockArn).text().null())
                    .col(ColumnDef::new(ConfigKeys::BedrockDeploymentsJson).text().null())
                    .col(ColumnDef::new(ConfigKeys::ApertusEndpoint).text().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_config_keys_provider_id")
                            .from(ConfigKeys::Table, ConfigKeys::ProviderId)
                            .to(ConfigProviders::Table, ConfigProviders::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_config_keys_provider_id")
                    .table(ConfigKeys::Table)
                    .col(ConfigKeys::ProviderId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_config_keys_provider")
                    .table(ConfigKeys::Table)
                    .col(ConfigKeys::Provider)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ConfigKeys::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub(super) enum ConfigKeys {
    Table,
    Id,
    Name,
    ProviderId,
    Provider,
    KeyId,
    Value,
    ModelsJson,
    Weight,
    CreatedAt,
    UpdatedAt,
    AzureEndpoint,
    AzureApiVersion,
    AzureDeploymentsJson,
    VertexProjectId,
    VertexRegion,
    VertexAuthCredentials,
    BedrockAccessKey,
    BedrockSecretKey,
    BedrockSessionToken,
    BedrockRegion,
    BedrockArn,
    BedrockDeploymentsJson,
    ApertusEndpoint,
}
