use sea_orm::entity::prelude::*;
use sea_orm::sea_query::ForeignKeyAction;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "license_assets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub license_id: Uuid,
    pub asset_id: Uuid,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    License,
    Asset,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Self::License => Entity::belongs_to(super::License::Entity)
                .from(Column::LicenseId)
                .to(super::License::Column::Id)
                .on_delete(ForeignKeyAction::Cascade)
                .into(),
            Self::Asset => Entity::belongs_to(super::Asset::Entity)
                .from(Column::AssetId)
                .to(super::Asset::Column::Id)
                .on_delete(ForeignKeyAction::Cascade)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}
