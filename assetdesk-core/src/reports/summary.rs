use std::collections::HashMap;

use assetdesk_db_entities::Asset::{self, AssetStatus};
use assetdesk_db_entities::{Category, License, Location, Staff};
use chrono::{Days, NaiveDate};
use poem_openapi::Object;
use sea_orm::{ConnectionTrait, DbErr, EntityTrait, PaginatorTrait, QueryOrder, QuerySelect};
use serde::Serialize;
use uuid::Uuid;

use super::StatusCounts;
use crate::consts::UNCATEGORIZED_LABEL;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Object)]
pub struct CategoryCount {
    /// Empty for assets without a category
    pub category_id: Option<Uuid>,
    pub name: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Object)]
pub struct DashboardSummary {
    pub total_assets: u64,
    pub assets_by_status: StatusCounts,
    pub assets_by_category: Vec<CategoryCount>,
    pub total_staff: u64,
    pub total_locations: u64,
    pub total_licenses: u64,
    /// Licenses whose expiration date falls within the warning window
    pub expiring_licenses: Vec<License::Model>,
    /// Licenses with every seat in use
    pub exhausted_licenses: Vec<License::Model>,
}

/// Licenses expiring between `today` and `today + window`, soonest first.
pub fn licenses_expiring(
    licenses: &[License::Model],
    today: NaiveDate,
    window_days: u64,
) -> Vec<License::Model> {
    let until = today
        .checked_add_days(Days::new(window_days))
        .unwrap_or(NaiveDate::MAX);
    let mut expiring: Vec<_> = licenses
        .iter()
        .filter(|l| {
            l.expiration_date
                .is_some_and(|date| date >= today && date <= until)
        })
        .cloned()
        .collect();
    expiring.sort_by_key(|l| l.expiration_date);
    expiring
}

pub fn licenses_exhausted(licenses: &[License::Model]) -> Vec<License::Model> {
    licenses
        .iter()
        .filter(|l| l.seats_exhausted())
        .cloned()
        .collect()
}

/// Groups assets by category, largest group first. Assets without a
/// category (or pointing at a missing one) land in a single bucket.
pub fn count_by_category(
    categories: &HashMap<Uuid, String>,
    asset_categories: impl IntoIterator<Item = Option<Uuid>>,
) -> Vec<CategoryCount> {
    let mut counts: HashMap<Option<Uuid>, u64> = HashMap::new();
    for category_id in asset_categories {
        let key = category_id.filter(|id| categories.contains_key(id));
        *counts.entry(key).or_default() += 1;
    }
    let mut result: Vec<_> = counts
        .into_iter()
        .map(|(category_id, count)| CategoryCount {
            name: category_id
                .and_then(|id| categories.get(&id).cloned())
                .unwrap_or_else(|| UNCATEGORIZED_LABEL.to_owned()),
            category_id,
            count,
        })
        .collect();
    result.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    result
}

pub async fn load_dashboard_summary<C: ConnectionTrait>(
    db: &C,
    today: NaiveDate,
    expiry_window_days: u64,
) -> Result<DashboardSummary, DbErr> {
    let assets = Asset::Entity::find()
        .select_only()
        .columns([Asset::Column::Status, Asset::Column::CategoryId])
        .into_tuple::<(AssetStatus, Option<Uuid>)>()
        .all(db)
        .await?;

    let categories: HashMap<Uuid, String> = Category::Entity::find()
        .select_only()
        .columns([Category::Column::Id, Category::Column::Name])
        .into_tuple::<(Uuid, String)>()
        .all(db)
        .await?
        .into_iter()
        .collect();

    let licenses = License::Entity::find()
        .order_by_asc(License::Column::Name)
        .all(db)
        .await?;

    let mut assets_by_status = StatusCounts::default();
    for (status, _) in &assets {
        assets_by_status.add(*status);
    }

    Ok(DashboardSummary {
        total_assets: assets.len() as u64,
        assets_by_status,
        assets_by_category: count_by_category(
            &categories,
            assets.iter().map(|(_, category_id)| *category_id),
        ),
        total_staff: Staff::Entity::find().count(db).await?,
        total_locations: Location::Entity::find().count(db).await?,
        total_licenses: licenses.len() as u64,
        expiring_licenses: licenses_expiring(&licenses, today, expiry_window_days),
        exhausted_licenses: licenses_exhausted(&licenses),
    })
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn license(name: &str, expires: Option<NaiveDate>, total: i32, used: i32) -> License::Model {
        License::Model {
            id: Uuid::new_v4(),
            name: name.into(),
            license_key: format!("KEY-{name}"),
            license_type: None,
            purchase_date: None,
            expiration_date: expires,
            seats_total: total,
            seats_used: used,
            cost: None,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn date(month: u32, day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(2024, month, day)
    }

    #[test]
    fn expiry_window_is_inclusive() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let licenses = [
            license("expired", date(5, 31), 1, 0),
            license("today", date(6, 1), 1, 0),
            license("edge", date(7, 1), 1, 0),
            license("later", date(7, 2), 1, 0),
            license("perpetual", None, 1, 0),
        ];
        let names: Vec<_> = licenses_expiring(&licenses, today, 30)
            .into_iter()
            .map(|l| l.name)
            .collect();
        assert_eq!(names, ["today", "edge"]);
    }

    #[test]
    fn full_licenses_are_exhausted() {
        let licenses = [
            license("free", None, 5, 4),
            license("full", None, 5, 5),
            license("over", None, 5, 7),
        ];
        let names: Vec<_> = licenses_exhausted(&licenses)
            .into_iter()
            .map(|l| l.name)
            .collect();
        assert_eq!(names, ["full", "over"]);
    }

    #[test]
    fn unknown_categories_are_uncategorized() {
        let laptops = Uuid::new_v4();
        let categories = HashMap::from([(laptops, "Laptops".to_owned())]);
        let counts = count_by_category(
            &categories,
            [Some(laptops), Some(laptops), None, Some(Uuid::new_v4())],
        );
        assert_eq!(
            counts,
            [
                CategoryCount {
                    category_id: Some(laptops),
                    name: "Laptops".into(),
                    count: 2,
                },
                CategoryCount {
                    category_id: None,
                    name: UNCATEGORIZED_LABEL.into(),
                    count: 2,
                },
            ]
        );
    }

    #[tokio::test]
    async fn summary_counts_database_rows() {
        use assetdesk_common::AssetCodeConfig;

        use crate::assets::{create_asset, NewAsset};
        use crate::test_helpers::{insert_category, insert_location, memory_db};

        let db = memory_db().await;
        let laptops = insert_category(&db, "Laptops", "LAP").await;
        insert_location(&db, "HQ").await;
        for status in [AssetStatus::Active, AssetStatus::Disposed] {
            create_asset(
                &db,
                &AssetCodeConfig::default(),
                "admin",
                NewAsset {
                    category_id: Some(laptops.id),
                    status: Some(status),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        }

        let summary = load_dashboard_summary(&db, Utc::now().date_naive(), 30)
            .await
            .unwrap();
        assert_eq!(summary.total_assets, 2);
        assert_eq!(summary.assets_by_status.active, 1);
        assert_eq!(summary.assets_by_status.disposed, 1);
        assert_eq!(summary.assets_by_category.len(), 1);
        assert_eq!(summary.assets_by_category[0].count, 2);
        assert_eq!(summary.total_locations, 1);
        assert_eq!(summary.total_staff, 0);
        assert!(summary.expiring_licenses.is_empty());
    }
}
