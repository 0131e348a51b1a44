//! Asset writes: name generation on create, change history on every write.

use assetdesk_common::{AssetCodeConfig, AssetdeskError, DuplicateKey};
use assetdesk_db_entities::Asset::{self, AssetStatus};
use assetdesk_db_entities::{Category, Staff};
use chrono::{NaiveDate, Utc};
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, Set};
use tracing::*;
use uuid::Uuid;

use crate::asset_codes::generate_asset_name;
use crate::history::{
    diff_asset, load_display_names, normalize_text, record_asset_changes, record_asset_created,
    AssetSnapshot,
};

#[derive(Debug, Clone, Default)]
pub struct NewAsset {
    /// Generated from the category code when empty
    pub name: Option<String>,
    pub serial_number: Option<String>,
    pub category_id: Option<Uuid>,
    pub status: Option<AssetStatus>,
    pub assigned_to: Option<Uuid>,
    pub purchase_date: Option<NaiveDate>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct AssetUpdate {
    pub serial_number: Option<String>,
    pub category_id: Option<Uuid>,
    pub status: AssetStatus,
    pub assigned_to: Option<Uuid>,
    pub purchase_date: Option<NaiveDate>,
    pub description: Option<String>,
    /// Backdates (or forward-dates) a status change
    pub effective_date: Option<NaiveDate>,
}

async fn find_category<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<Category::Model, AssetdeskError> {
    Category::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(AssetdeskError::CategoryNotFound(id))
}

async fn ensure_references<C: ConnectionTrait>(
    db: &C,
    category_id: Option<Uuid>,
    assigned_to: Option<Uuid>,
) -> Result<(), AssetdeskError> {
    if let Some(id) = category_id {
        find_category(db, id).await?;
    }
    if let Some(id) = assigned_to {
        if Staff::Entity::find_by_id(id).one(db).await?.is_none() {
            return Err(AssetdeskError::StaffNotFound(id));
        }
    }
    Ok(())
}

/// Next free name for the category, see [`crate::asset_codes`].
pub async fn next_name_for_category<C: ConnectionTrait>(
    db: &C,
    codes: &AssetCodeConfig,
    category_id: Uuid,
) -> Result<String, AssetdeskError> {
    let category = find_category(db, category_id).await?;
    Ok(generate_asset_name(db, &codes.prefix, &category.code, codes.width).await?)
}

pub async fn create_asset<C: ConnectionTrait>(
    db: &C,
    codes: &AssetCodeConfig,
    actor: &str,
    new: NewAsset,
) -> Result<Asset::Model, AssetdeskError> {
    ensure_references(db, new.category_id, new.assigned_to).await?;

    let name = match normalize_text(new.name.as_deref()) {
        Some(name) => name.trim().to_owned(),
        None => {
            let category_id = new.category_id.ok_or(AssetdeskError::MissingCategoryCode)?;
            next_name_for_category(db, codes, category_id).await?
        }
    };

    let now = Utc::now();
    let values = Asset::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        serial_number: Set(normalize_text(new.serial_number.as_deref())),
        category_id: Set(new.category_id),
        status: Set(new.status.unwrap_or_default()),
        assigned_to: Set(new.assigned_to),
        purchase_date: Set(new.purchase_date),
        description: Set(normalize_text(new.description.as_deref())),
        created_at: Set(now),
        updated_at: Set(now),
    };

    let asset = values.insert(db).await.map_err(|e| {
        AssetdeskError::from_write(e, &[DuplicateKey::AssetName, DuplicateKey::SerialNumber])
    })?;

    info!(asset = %asset.id, name = %asset.name, %actor, "Asset created");
    record_asset_created(db, &asset, actor).await;

    Ok(asset)
}

/// Replaces the editable fields of an asset. The name is never changed.
///
/// Returns `None` if the asset does not exist.
pub async fn update_asset<C: ConnectionTrait>(
    db: &C,
    actor: &str,
    id: Uuid,
    update: AssetUpdate,
) -> Result<Option<Asset::Model>, AssetdeskError> {
    let Some(asset) = Asset::Entity::find_by_id(id).one(db).await? else {
        return Ok(None);
    };
    ensure_references(db, update.category_id, update.assigned_to).await?;

    let old = AssetSnapshot::from(&asset);

    let mut model: Asset::ActiveModel = asset.into();
    model.serial_number = Set(normalize_text(update.serial_number.as_deref()));
    model.category_id = Set(update.category_id);
    model.status = Set(update.status);
    model.assigned_to = Set(update.assigned_to);
    model.purchase_date = Set(update.purchase_date);
    model.description = Set(normalize_text(update.description.as_deref()));
    model.updated_at = Set(Utc::now());

    let asset = model
        .update(db)
        .await
        .map_err(|e| AssetdeskError::from_write(e, &[DuplicateKey::SerialNumber]))?;

    let new = AssetSnapshot::from(&asset);
    if old != new {
        match load_display_names(
            db,
            [old.category_id, new.category_id].into_iter().flatten(),
            [old.assigned_to, new.assigned_to].into_iter().flatten(),
            [],
        )
        .await
        {
            Ok(names) => {
                let changes = diff_asset(&old, &new, &names, update.effective_date);
                record_asset_changes(db, asset.id, &changes, actor).await;
            }
            Err(error) => {
                error!(asset = %asset.id, ?error, "Failed to resolve names for asset history");
            }
        }
    }

    Ok(Some(asset))
}

#[cfg(test)]
mod tests {
    use assetdesk_db_entities::{AssetHistory, ChangeType};
    use sea_orm::{ColumnTrait, ModelTrait, PaginatorTrait, QueryFilter, QueryOrder};

    use super::*;
    use crate::history::{FIELD_ASSIGNED_TO, FIELD_NAME, FIELD_STATUS};
    use crate::test_helpers::{insert_category, insert_staff, memory_db};

    async fn history_of<C: ConnectionTrait>(db: &C, asset_id: Uuid) -> Vec<AssetHistory::Model> {
        AssetHistory::Entity::find()
            .filter(AssetHistory::Column::AssetId.eq(asset_id))
            .order_by_asc(AssetHistory::Column::CreatedAt)
            .all(db)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn create_generates_name_and_records_one_create_row() {
        let db = memory_db().await;
        let laptops = insert_category(&db, "Laptops", "LAP").await;

        let asset = create_asset(
            &db,
            &AssetCodeConfig::default(),
            "alice",
            NewAsset {
                category_id: Some(laptops.id),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(asset.name, "ORG-LAP-001");
        assert_eq!(asset.status, AssetStatus::Active);

        let history = history_of(&db, asset.id).await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].change_type, ChangeType::Create);
        assert_eq!(history[0].field_name, FIELD_NAME);
        assert_eq!(history[0].new_value.as_deref(), Some("ORG-LAP-001"));
        assert_eq!(history[0].changed_by.as_deref(), Some("alice"));

        let second = create_asset(
            &db,
            &AssetCodeConfig::default(),
            "alice",
            NewAsset {
                category_id: Some(laptops.id),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(second.name, "ORG-LAP-002");
    }

    #[tokio::test]
    async fn create_without_name_or_category_is_rejected() {
        let db = memory_db().await;
        let err = create_asset(&db, &AssetCodeConfig::default(), "alice", NewAsset::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AssetdeskError::MissingCategoryCode));
    }

    #[tokio::test]
    async fn duplicate_names_and_serials_are_reported() {
        let db = memory_db().await;
        let codes = AssetCodeConfig::default();
        let first = create_asset(
            &db,
            &codes,
            "alice",
            NewAsset {
                name: Some("ORG-LAP-001".into()),
                serial_number: Some("SN-1".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let err = create_asset(
            &db,
            &codes,
            "bob",
            NewAsset {
                name: Some("ORG-LAP-001".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            AssetdeskError::Duplicate(DuplicateKey::AssetName)
        ));

        let err = create_asset(
            &db,
            &codes,
            "bob",
            NewAsset {
                name: Some("ORG-LAP-002".into()),
                serial_number: Some("SN-1".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            AssetdeskError::Duplicate(DuplicateKey::SerialNumber)
        ));

        assert_eq!(Asset::Entity::find().count(&db).await.unwrap(), 1);
        let stored = Asset::Entity::find_by_id(first.id).one(&db).await.unwrap();
        assert_eq!(stored, Some(first));
    }

    #[tokio::test]
    async fn update_records_only_changed_fields() {
        let db = memory_db().await;
        let alice = insert_staff(&db, "S-001", "Alice").await;
        let asset = create_asset(
            &db,
            &AssetCodeConfig::default(),
            "admin",
            NewAsset {
                name: Some("ORG-LAP-001".into()),
                description: Some("".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        // nothing but an empty description turning into a missing one
        update_asset(
            &db,
            "admin",
            asset.id,
            AssetUpdate {
                description: None,
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(history_of(&db, asset.id).await.len(), 1);

        let effective = NaiveDate::from_ymd_opt(2024, 2, 10);
        update_asset(
            &db,
            "admin",
            asset.id,
            AssetUpdate {
                status: AssetStatus::Maintenance,
                assigned_to: Some(alice.id),
                effective_date: effective,
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

        let history = history_of(&db, asset.id).await;
        assert_eq!(history.len(), 3);
        let status = history.iter().find(|h| h.field_name == FIELD_STATUS).unwrap();
        assert_eq!(status.change_type, ChangeType::Update);
        assert_eq!(status.old_value.as_deref(), Some("active"));
        assert_eq!(status.new_value.as_deref(), Some("maintenance"));
        assert_eq!(status.effective_date, effective);
        let assigned = history
            .iter()
            .find(|h| h.field_name == FIELD_ASSIGNED_TO)
            .unwrap();
        assert_eq!(assigned.old_value, None);
        assert_eq!(assigned.new_value.as_deref(), Some("Alice"));
        assert_eq!(assigned.effective_date, None);
    }

    #[tokio::test]
    async fn history_failure_does_not_fail_the_update() {
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

        db.execute_unprepared("DROP TABLE asset_history")
            .await
            .unwrap();

        let updated = update_asset(
            &db,
            "admin",
            asset.id,
            AssetUpdate {
                status: AssetStatus::Disposed,
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(updated.status, AssetStatus::Disposed);

        let stored = Asset::Entity::find_by_id(asset.id)
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, AssetStatus::Disposed);
    }

    #[tokio::test]
    async fn deleting_an_asset_removes_its_history() {
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
        let id = asset.id;
        asset.delete(&db).await.unwrap();
        assert!(history_of(&db, id).await.is_empty());
    }

    #[tokio::test]
    async fn unknown_references_are_rejected() {
        let db = memory_db().await;
        let missing = Uuid::new_v4();
        let err = create_asset(
            &db,
            &AssetCodeConfig::default(),
            "admin",
            NewAsset {
                category_id: Some(missing),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AssetdeskError::CategoryNotFound(id) if id == missing));
    }
}
