use chrono::{DateTime, NaiveDate, Utc};
use poem_openapi::Object;
use sea_orm::entity::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::ChangeType;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Object)]
#[sea_orm(table_name = "staff_history")]
#[oai(rename = "StaffHistoryEntry")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub staff_id: Uuid,
    pub field_name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub old_value: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub new_value: Option<String>,
    pub change_type: ChangeType,
    pub changed_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub effective_date: Option<NaiveDate>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::Staff::Entity",
        from = "Column::StaffId",
        to = "super::Staff::Column::Id",
        on_delete = "Cascade"
    )]
    Staff,
}

impl Related<super::Staff::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Staff.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
