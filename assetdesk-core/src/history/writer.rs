use std::collections::HashSet;

use assetdesk_db_entities::{
    Asset, AssetHistory, Category, ChangeType, Location, Staff, StaffHistory,
};
use chrono::Utc;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QuerySelect, Set,
};
use tracing::*;
use uuid::Uuid;

use super::tracker::{DisplayNames, FieldChange, FIELD_NAME, FIELD_STAFF_ID};

/// Resolves the names for every id that can show up in a history row.
pub async fn load_display_names<C: ConnectionTrait>(
    db: &C,
    category_ids: impl IntoIterator<Item = Uuid>,
    staff_ids: impl IntoIterator<Item = Uuid>,
    location_ids: impl IntoIterator<Item = Uuid>,
) -> Result<DisplayNames, DbErr> {
    let category_ids: HashSet<Uuid> = category_ids.into_iter().collect();
    let staff_ids: HashSet<Uuid> = staff_ids.into_iter().collect();
    let location_ids: HashSet<Uuid> = location_ids.into_iter().collect();

    let mut names = DisplayNames::default();

    if !category_ids.is_empty() {
        names.categories = Category::Entity::find()
            .select_only()
            .columns([Category::Column::Id, Category::Column::Name])
            .filter(Category::Column::Id.is_in(category_ids))
            .into_tuple::<(Uuid, String)>()
            .all(db)
            .await?
            .into_iter()
            .collect();
    }

    if !staff_ids.is_empty() {
        names.staff = Staff::Entity::find()
            .select_only()
            .columns([Staff::Column::Id, Staff::Column::Name])
            .filter(Staff::Column::Id.is_in(staff_ids))
            .into_tuple::<(Uuid, String)>()
            .all(db)
            .await?
            .into_iter()
            .collect();
    }

    if !location_ids.is_empty() {
        names.locations = Location::Entity::find()
            .select_only()
            .columns([Location::Column::Id, Location::Column::Name])
            .filter(Location::Column::Id.is_in(location_ids))
            .into_tuple::<(Uuid, String)>()
            .all(db)
            .await?
            .into_iter()
            .collect();
    }

    Ok(names)
}

pub async fn insert_asset_history<C: ConnectionTrait>(
    db: &C,
    asset_id: Uuid,
    change_type: ChangeType,
    changes: &[FieldChange],
    actor: &str,
) -> Result<(), DbErr> {
    if changes.is_empty() {
        return Ok(());
    }
    let now = Utc::now();
    let rows = changes.iter().map(|change| AssetHistory::ActiveModel {
        id: Set(Uuid::new_v4()),
        asset_id: Set(asset_id),
        field_name: Set(change.field.to_owned()),
        old_value: Set(change.old_value.clone()),
        new_value: Set(change.new_value.clone()),
        change_type: Set(change_type),
        changed_by: Set(Some(actor.to_owned())),
        created_at: Set(now),
        effective_date: Set(change.effective_date),
    });
    AssetHistory::Entity::insert_many(rows)
        .exec_without_returning(db)
        .await?;
    Ok(())
}

pub async fn insert_staff_history<C: ConnectionTrait>(
    db: &C,
    staff_id: Uuid,
    change_type: ChangeType,
    changes: &[FieldChange],
    actor: &str,
) -> Result<(), DbErr> {
    if changes.is_empty() {
        return Ok(());
    }
    let now = Utc::now();
    let rows = changes.iter().map(|change| StaffHistory::ActiveModel {
        id: Set(Uuid::new_v4()),
        staff_id: Set(staff_id),
        field_name: Set(change.field.to_owned()),
        old_value: Set(change.old_value.clone()),
        new_value: Set(change.new_value.clone()),
        change_type: Set(change_type),
        changed_by: Set(Some(actor.to_owned())),
        created_at: Set(now),
        effective_date: Set(change.effective_date),
    });
    StaffHistory::Entity::insert_many(rows)
        .exec_without_returning(db)
        .await?;
    Ok(())
}

/// Appends the `create` row for a new asset. Failures are logged only.
pub async fn record_asset_created<C: ConnectionTrait>(db: &C, asset: &Asset::Model, actor: &str) {
    let change = FieldChange {
        field: FIELD_NAME,
        old_value: None,
        new_value: Some(asset.name.clone()),
        effective_date: None,
    };
    if let Err(error) =
        insert_asset_history(db, asset.id, ChangeType::Create, &[change], actor).await
    {
        error!(asset = %asset.id, %actor, ?error, "Failed to record asset creation");
    }
}

/// Appends one `update` row per change. Failures are logged only.
pub async fn record_asset_changes<C: ConnectionTrait>(
    db: &C,
    asset_id: Uuid,
    changes: &[FieldChange],
    actor: &str,
) {
    match insert_asset_history(db, asset_id, ChangeType::Update, changes, actor).await {
        Ok(()) => {
            for change in changes {
                debug!(asset = %asset_id, field = change.field, %actor, "Recorded asset change");
            }
        }
        Err(error) => {
            error!(asset = %asset_id, %actor, ?error, "Failed to record asset changes");
        }
    }
}

pub async fn record_staff_created<C: ConnectionTrait>(db: &C, staff: &Staff::Model, actor: &str) {
    let change = FieldChange {
        field: FIELD_STAFF_ID,
        old_value: None,
        new_value: Some(staff.staff_id.clone()),
        effective_date: None,
    };
    if let Err(error) =
        insert_staff_history(db, staff.id, ChangeType::Create, &[change], actor).await
    {
        error!(staff = %staff.id, %actor, ?error, "Failed to record staff creation");
    }
}

pub async fn record_staff_changes<C: ConnectionTrait>(
    db: &C,
    staff_id: Uuid,
    changes: &[FieldChange],
    actor: &str,
) {
    if let Err(error) =
        insert_staff_history(db, staff_id, ChangeType::Update, changes, actor).await
    {
        error!(staff = %staff_id, %actor, ?error, "Failed to record staff changes");
    }
}
