use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("licenses"))
                    .col(
                        ColumnDef::new(Alias::new("id"))
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Alias::new("name")).string().not_null())
                    .col(
                        ColumnDef::new(Alias::new("license_key"))
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Alias::new("license_type")).string().null())
                    .col(ColumnDef::new(Alias::new("purchase_date")).date().null())
                    .col(ColumnDef::new(Alias::new("expiration_date")).date().null())
                    .col(
                        ColumnDef::new(Alias::new("seats_total"))
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(Alias::new("seats_used"))
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Alias::new("cost")).double().null())
                    .col(ColumnDef::new(Alias::new("notes")).text().null())
                    .col(
                        ColumnDef::new(Alias::new("created_at"))
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("updated_at"))
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Declared for license seat tracking, nothing writes to it yet
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("license_assets"))
                    .col(
                        ColumnDef::new(Alias::new("id"))
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Alias::new("license_id")).uuid().not_null())
                    .col(ColumnDef::new(Alias::new("asset_id")).uuid().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_license_assets_license")
                            .from(Alias::new("license_assets"), Alias::new("license_id"))
                            .to(Alias::new("licenses"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_license_assets_asset")
                            .from(Alias::new("license_assets"), Alias::new("asset_id"))
                            .to(Alias::new("assets"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Alias::new("license_assets")).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Alias::new("licenses")).to_owned())
            .await?;
        Ok(())
    }
}
