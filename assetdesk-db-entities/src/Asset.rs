use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use poem_openapi::{Enum, Object};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    Enum,
    EnumIter,
    DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
#[oai(rename_all = "lowercase")]
pub enum AssetStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "maintenance")]
    Maintenance,
    #[sea_orm(string_value = "inactive")]
    Inactive,
    #[sea_orm(string_value = "disposed")]
    Disposed,
}

impl AssetStatus {
    pub const ALL: [AssetStatus; 4] = [
        AssetStatus::Active,
        AssetStatus::Maintenance,
        AssetStatus::Inactive,
        AssetStatus::Disposed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Maintenance => "maintenance",
            Self::Inactive => "inactive",
            Self::Disposed => "disposed",
        }
    }
}

impl Default for AssetStatus {
    fn default() -> Self {
        Self::Active
    }
}

impl fmt::Display for AssetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown asset status: {:?}", self.0)
    }
}

impl std::error::Error for UnknownStatus {}

impl FromStr for AssetStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s.trim())
            .ok_or_else(|| UnknownStatus(s.to_owned()))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Object)]
#[sea_orm(table_name = "assets")]
#[oai(rename = "Asset")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// `<prefix>-<category code>-<sequence>`, unique
    #[sea_orm(unique)]
    pub name: String,
    #[sea_orm(unique, nullable)]
    pub serial_number: Option<String>,
    pub category_id: Option<Uuid>,
    pub status: AssetStatus,
    /// Staff member the asset is assigned to
    pub assigned_to: Option<Uuid>,
    pub purchase_date: Option<NaiveDate>,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::Category::Entity",
        from = "Column::CategoryId",
        to = "super::Category::Column::Id",
        on_delete = "SetNull"
    )]
    Category,
    #[sea_orm(
        belongs_to = "super::Staff::Entity",
        from = "Column::AssignedTo",
        to = "super::Staff::Column::Id",
        on_delete = "SetNull"
    )]
    AssignedStaff,
    #[sea_orm(has_many = "super::AssetHistory::Entity")]
    History,
}

impl Related<super::Category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::Staff::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AssignedStaff.def()
    }
}

impl Related<super::AssetHistory::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::History.def()
    }
}

impl Related<super::License::Entity> for Entity {
    fn to() -> RelationDef {
        super::LicenseAsset::Relation::License.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::LicenseAsset::Relation::Asset.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_strings_round_trip() {
        for status in AssetStatus::ALL {
            assert_eq!(status.as_str().parse::<AssetStatus>(), Ok(status));
        }
        assert_eq!(" disposed ".parse::<AssetStatus>(), Ok(AssetStatus::Disposed));
        assert!("retired".parse::<AssetStatus>().is_err());
    }
}
