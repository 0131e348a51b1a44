use chrono::{DateTime, NaiveDate, Utc};
use poem_openapi::Object;
use sea_orm::entity::prelude::*;
use serde::Serialize;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Object)]
#[sea_orm(table_name = "licenses")]
#[oai(rename = "License")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub license_key: String,
    pub license_type: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub expiration_date: Option<NaiveDate>,
    pub seats_total: i32,
    pub seats_used: i32,
    pub cost: Option<f64>,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl Related<super::Asset::Entity> for Entity {
    fn to() -> RelationDef {
        super::LicenseAsset::Relation::Asset.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::LicenseAsset::Relation::License.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn seats_exhausted(&self) -> bool {
        self.seats_used >= self.seats_total
    }
}
