use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ConfigProviders::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ConfigProviders::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ConfigProviders::Name)
                            .string_len(50)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(ConfigProviders::NetworkConfigJson).text().null())
                    .col(ColumnDef::new(ConfigProviders::ConcurrencyBufferJson).text().null())
                    .col(ColumnDef::new(ConfigProviders::ProxyConfigJson).text().null())
                    .col(ColumnDef::new(ConfigProviders::CustomProviderConfigJson).text().null())
                    .col(
                        ColumnDef::new(ConfigProviders::SendBackRawResponse)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(ConfigProviders::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(ConfigProviders::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ConfigProviders::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub(super) enum ConfigProviders {
    Table,
    Id,
    Name,
    NetworkConfigJson,
    ConcurrencyBufferJson,
    ProxyConfigJson,
    CustomProviderConfigJson,
    SendBackRawResponse,
    CreatedAt,
    UpdatedAt,
}
