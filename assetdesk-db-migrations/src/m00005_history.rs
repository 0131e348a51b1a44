use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Both history tables share a layout and differ only in the entity they point at.
fn history_table(table: &str, owner_column: &str, owner_table: &str) -> TableCreateStatement {
    Table::create()
        .table(Alias::new(table))
        .col(
            ColumnDef::new(Alias::new("id"))
                .uuid()
                .not_null()
                .primary_key(),
        )
        .col(ColumnDef::new(Alias::new(owner_column)).uuid().not_null())
        .col(
            ColumnDef::new(Alias::new("field_name"))
                .string_len(64)
                .not_null(),
        )
        .col(ColumnDef::new(Alias::new("old_value")).text().null())
        .col(ColumnDef::new(Alias::new("new_value")).text().null())
        .col(
            ColumnDef::new(Alias::new("change_type"))
                .string_len(16)
                .not_null(),
        )
        .col(ColumnDef::new(Alias::new("changed_by")).string().null())
        .col(
            ColumnDef::new(Alias::new("created_at"))
                .timestamp_with_time_zone()
                .not_null(),
        )
        .col(ColumnDef::new(Alias::new("effective_date")).date().null())
        .foreign_key(
            ForeignKey::create()
                .name(format!("fk_{table}_{owner_column}"))
                .from(Alias::new(table), Alias::new(owner_column))
                .to(Alias::new(owner_table), Alias::new("id"))
                .on_delete(ForeignKeyAction::Cascade),
        )
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(history_table("asset_history", "asset_id", "assets"))
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Alias::new("asset_history"))
                    .name("idx_ah_asset")
                    .col(Alias::new("asset_id"))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Alias::new("asset_history"))
                    .name("idx_ah_field")
                    .col(Alias::new("field_name"))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(history_table("staff_history", "staff_id", "staff"))
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Alias::new("staff_history"))
                    .name("idx_sh_staff")
                    .col(Alias::new("staff_id"))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Alias::new("staff_history")).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Alias::new("asset_history")).to_owned())
            .await?;
        Ok(())
    }
}
