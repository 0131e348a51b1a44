use chrono::{DateTime, NaiveDate, Utc};
use poem_openapi::Object;
use sea_orm::entity::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::ChangeType;

/// One field change of one asset. Rows are only ever inserted.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Object)]
#[sea_orm(table_name = "asset_history")]
#[oai(rename = "AssetHistoryEntry")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub asset_id: Uuid,
    pub field_name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub old_value: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub new_value: Option<String>,
    pub change_type: ChangeType,
    /// Actor the change was made by
    pub changed_by: Option<String>,
    pub created_at: DateTime<Utc>,
    /// When the change is asserted to have taken effect, if not `created_at`
    pub effective_date: Option<NaiveDate>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::Asset::Entity",
        from = "Column::AssetId",
        to = "super::Asset::Column::Id",
        on_delete = "Cascade"
    )]
    Asset,
}

impl Related<super::Asset::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Asset.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
