//! Month-end status counts reconstructed from the status history.

use std::collections::HashMap;
use std::str::FromStr;

use assetdesk_db_entities::Asset::{self, AssetStatus};
use assetdesk_db_entities::AssetHistory;
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use poem_openapi::Object;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};
use serde::Serialize;
use tracing::*;
use uuid::Uuid;

use crate::consts::MAX_TIMELINE_MONTHS;
use crate::history::FIELD_STATUS;

/// The parts of an asset the timeline needs.
#[derive(Debug, Clone)]
pub struct AssetPoint {
    pub id: Uuid,
    pub status: AssetStatus,
    pub created_at: DateTime<Utc>,
}

/// One `status` history row.
#[derive(Debug, Clone)]
pub struct StatusEntry {
    pub asset_id: Uuid,
    pub new_value: Option<String>,
    pub created_at: DateTime<Utc>,
    pub effective_date: Option<NaiveDate>,
}

impl StatusEntry {
    /// When the change is considered to have happened.
    pub fn effective_at(&self) -> DateTime<Utc> {
        self.effective_date
            .map(|date| date.and_time(NaiveTime::MIN).and_utc())
            .unwrap_or(self.created_at)
    }
}

impl From<AssetHistory::Model> for StatusEntry {
    fn from(row: AssetHistory::Model) -> Self {
        Self {
            asset_id: row.asset_id,
            new_value: row.new_value,
            created_at: row.created_at,
            effective_date: row.effective_date,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Object)]
pub struct StatusCounts {
    pub active: u64,
    pub maintenance: u64,
    pub inactive: u64,
    pub disposed: u64,
}

impl StatusCounts {
    pub fn add(&mut self, status: AssetStatus) {
        *self.slot(status) += 1;
    }

    pub fn get(&self, status: AssetStatus) -> u64 {
        match status {
            AssetStatus::Active => self.active,
            AssetStatus::Maintenance => self.maintenance,
            AssetStatus::Inactive => self.inactive,
            AssetStatus::Disposed => self.disposed,
        }
    }

    fn slot(&mut self, status: AssetStatus) -> &mut u64 {
        match status {
            AssetStatus::Active => &mut self.active,
            AssetStatus::Maintenance => &mut self.maintenance,
            AssetStatus::Inactive => &mut self.inactive,
            AssetStatus::Disposed => &mut self.disposed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Object)]
pub struct StatusBucket {
    /// `YYYY-MM`
    pub month: String,
    /// Last instant of the month
    pub cutoff: DateTime<Utc>,
    pub counts: StatusCounts,
    pub total: u64,
}

fn shift_month(year: i32, month: u32, delta: i32) -> (i32, u32) {
    let index = year * 12 + month as i32 - 1 + delta;
    (index.div_euclid(12), index.rem_euclid(12) as u32 + 1)
}

fn month_start(year: i32, month: u32) -> Option<DateTime<Utc>> {
    NaiveDate::from_ymd_opt(year, month, 1).map(|date| date.and_time(NaiveTime::MIN).and_utc())
}

/// `(label, cutoff)` for the `months` calendar months ending with the one
/// containing `now`, oldest first. At most [`MAX_TIMELINE_MONTHS`] are returned.
pub fn month_cutoffs(now: DateTime<Utc>, months: u32) -> Vec<(String, DateTime<Utc>)> {
    let months = months.min(MAX_TIMELINE_MONTHS) as i32;
    (0..months)
        .rev()
        .filter_map(|back| {
            let (year, month) = shift_month(now.year(), now.month(), -back);
            let (next_year, next_month) = shift_month(year, month, 1);
            let cutoff = month_start(next_year, next_month)? - Duration::nanoseconds(1);
            Some((format!("{year:04}-{month:02}"), cutoff))
        })
        .collect()
}

/// Counts, for each trailing month, the status every asset had at the
/// month's last instant.
///
/// An asset is counted once it was created or once any of its status rows
/// is effective, whichever comes first. Its status is the `new_value` of
/// the latest row effective by the cutoff, or its current status when there
/// is none. Rows are ordered by [`StatusEntry::effective_at`]; ties keep the
/// order of `entries`.
pub fn status_timeline(
    now: DateTime<Utc>,
    months: u32,
    assets: &[AssetPoint],
    entries: &[StatusEntry],
) -> Vec<StatusBucket> {
    let mut by_asset: HashMap<Uuid, Vec<(DateTime<Utc>, AssetStatus)>> = HashMap::new();
    for entry in entries {
        let Some(status) = entry
            .new_value
            .as_deref()
            .and_then(|v| AssetStatus::from_str(v).ok())
        else {
            continue;
        };
        by_asset
            .entry(entry.asset_id)
            .or_default()
            .push((entry.effective_at(), status));
    }
    for history in by_asset.values_mut() {
        history.sort_by_key(|(at, _)| *at);
    }

    month_cutoffs(now, months)
        .into_iter()
        .map(|(month, cutoff)| {
            let mut counts = StatusCounts::default();
            let mut total = 0;
            for asset in assets {
                let history = by_asset.get(&asset.id).map(Vec::as_slice).unwrap_or(&[]);
                let latest = history.iter().take_while(|(at, _)| *at <= cutoff).last();
                if asset.created_at > cutoff && latest.is_none() {
                    continue;
                }
                counts.add(latest.map(|(_, status)| *status).unwrap_or(asset.status));
                total += 1;
            }
            StatusBucket {
                month,
                cutoff,
                counts,
                total,
            }
        })
        .collect()
}

pub async fn load_status_timeline<C: ConnectionTrait>(
    db: &C,
    now: DateTime<Utc>,
    months: u32,
) -> Result<Vec<StatusBucket>, DbErr> {
    let assets = Asset::Entity::find()
        .select_only()
        .columns([
            Asset::Column::Id,
            Asset::Column::Status,
            Asset::Column::CreatedAt,
        ])
        .into_tuple::<(Uuid, AssetStatus, DateTime<Utc>)>()
        .all(db)
        .await?
        .into_iter()
        .map(|(id, status, created_at)| AssetPoint {
            id,
            status,
            created_at,
        })
        .collect::<Vec<_>>();

    let entries = AssetHistory::Entity::find()
        .filter(AssetHistory::Column::FieldName.eq(FIELD_STATUS))
        .order_by_asc(AssetHistory::Column::CreatedAt)
        .all(db)
        .await?
        .into_iter()
        .map(StatusEntry::from)
        .collect::<Vec<_>>();

    debug!(
        assets = assets.len(),
        entries = entries.len(),
        months,
        "Computing status timeline"
    );

    Ok(status_timeline(now, months, &assets, &entries))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
    }

    fn asset(status: AssetStatus, created_at: DateTime<Utc>) -> AssetPoint {
        AssetPoint {
            id: Uuid::new_v4(),
            status,
            created_at,
        }
    }

    fn entry(asset: &AssetPoint, value: &str, effective: Option<NaiveDate>) -> StatusEntry {
        StatusEntry {
            asset_id: asset.id,
            new_value: Some(value.into()),
            created_at: at(2024, 6, 20),
            effective_date: effective,
        }
    }

    fn statuses(buckets: &[StatusBucket], status: AssetStatus) -> Vec<u64> {
        buckets.iter().map(|b| b.counts.get(status)).collect()
    }

    #[test]
    fn cutoffs_are_month_ends_oldest_first() {
        let cutoffs = month_cutoffs(at(2024, 2, 15), 3);
        let labels: Vec<_> = cutoffs.iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(labels, ["2023-12", "2024-01", "2024-02"]);
        assert_eq!(
            cutoffs[2].1,
            Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap() - Duration::nanoseconds(1)
        );
        assert_eq!(cutoffs[0].1.date_naive(), NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
        assert!(month_cutoffs(at(2024, 2, 15), 0).is_empty());
    }

    #[test]
    fn oversized_month_counts_are_clamped() {
        for months in [MAX_TIMELINE_MONTHS + 1, i32::MAX as u32 + 1, u32::MAX] {
            let cutoffs = month_cutoffs(at(2024, 2, 15), months);
            assert_eq!(cutoffs.len(), MAX_TIMELINE_MONTHS as usize);
            assert_eq!(cutoffs.last().unwrap().0, "2024-02");
        }
    }

    #[test]
    fn asset_without_history_keeps_current_status() {
        let laptop = asset(AssetStatus::Maintenance, at(2024, 3, 10));
        let buckets = status_timeline(at(2024, 6, 20), 6, &[laptop], &[]);

        assert_eq!(buckets.len(), 6);
        assert_eq!(buckets[0].month, "2024-01");
        assert_eq!(
            statuses(&buckets, AssetStatus::Maintenance),
            [0, 0, 1, 1, 1, 1]
        );
        assert_eq!(
            buckets.iter().map(|b| b.total).collect::<Vec<_>>(),
            [0, 0, 1, 1, 1, 1]
        );
    }

    #[test]
    fn status_change_applies_from_its_effective_month() {
        let laptop = asset(AssetStatus::Disposed, at(2024, 1, 5));
        let entries = [
            entry(&laptop, "maintenance", NaiveDate::from_ymd_opt(2024, 3, 10)),
            entry(&laptop, "disposed", NaiveDate::from_ymd_opt(2024, 5, 2)),
        ];
        let buckets = status_timeline(at(2024, 6, 20), 6, &[laptop], &entries);

        // before the first change the current status is assumed
        assert_eq!(statuses(&buckets, AssetStatus::Disposed), [1, 1, 0, 0, 1, 1]);
        assert_eq!(
            statuses(&buckets, AssetStatus::Maintenance),
            [0, 0, 1, 1, 0, 0]
        );
    }

    #[test]
    fn backdated_entry_makes_asset_exist_earlier() {
        let printer = asset(AssetStatus::Active, at(2024, 5, 1));
        let entries = [entry(
            &printer,
            "inactive",
            NaiveDate::from_ymd_opt(2024, 2, 14),
        )];
        let buckets = status_timeline(at(2024, 6, 20), 6, &[printer], &entries);

        assert_eq!(statuses(&buckets, AssetStatus::Inactive), [0, 1, 1, 1, 1, 1]);
        assert_eq!(buckets[0].total, 0);
    }

    #[test]
    fn record_time_is_used_without_effective_date() {
        let laptop = asset(AssetStatus::Inactive, at(2024, 1, 5));
        let mut change = entry(&laptop, "inactive", None);
        change.created_at = at(2024, 4, 30);
        let buckets = status_timeline(at(2024, 6, 20), 6, &[laptop], &[change]);

        assert_eq!(statuses(&buckets, AssetStatus::Inactive), [1, 1, 1, 1, 1, 1]);
    }

    #[test]
    fn ties_resolve_to_the_later_record() {
        let laptop = asset(AssetStatus::Active, at(2024, 1, 5));
        let day = NaiveDate::from_ymd_opt(2024, 4, 1);
        let entries = [
            entry(&laptop, "maintenance", day),
            entry(&laptop, "inactive", day),
        ];
        let buckets = status_timeline(at(2024, 6, 20), 3, &[laptop], &entries);
        assert_eq!(statuses(&buckets, AssetStatus::Inactive), [1, 1, 1]);
    }

    #[test]
    fn unknown_status_values_are_ignored() {
        let laptop = asset(AssetStatus::Active, at(2024, 1, 5));
        let entries = [entry(&laptop, "lost", NaiveDate::from_ymd_opt(2024, 2, 1))];
        let buckets = status_timeline(at(2024, 6, 20), 2, &[laptop], &entries);
        assert_eq!(statuses(&buckets, AssetStatus::Active), [1, 1]);
    }

    #[tokio::test]
    async fn loads_from_database() {
        use assetdesk_common::AssetCodeConfig;

        use crate::assets::{create_asset, update_asset, AssetUpdate, NewAsset};
        use crate::test_helpers::memory_db;

        let db = memory_db().await;
        let asset = create_asset(
            &db,
            &AssetCodeConfig::default(),
            "admin",
            NewAsset {
                name: Some("ORG-LAP-001".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        let now = Utc::now();
        let last_month = shift_month(now.year(), now.month(), -1);
        update_asset(
            &db,
            "admin",
            asset.id,
            AssetUpdate {
                status: AssetStatus::Maintenance,
                effective_date: NaiveDate::from_ymd_opt(last_month.0, last_month.1, 1),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let buckets = load_status_timeline(&db, now, 3).await.unwrap();
        assert_eq!(statuses(&buckets, AssetStatus::Maintenance), [0, 1, 1]);
    }
}
