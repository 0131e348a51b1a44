use assetdesk_common::{AssetdeskError, DuplicateKey};
use assetdesk_db_entities::{Location, Staff};
use chrono::{NaiveDate, Utc};
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, Set};
use tracing::*;
use uuid::Uuid;

use crate::history::{
    diff_staff, load_display_names, normalize_text, record_staff_changes, record_staff_created,
    StaffSnapshot,
};

#[derive(Debug, Clone, Default)]
pub struct StaffFields {
    pub staff_id: String,
    pub name: String,
    pub position: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location_id: Option<Uuid>,
}

async fn ensure_location<C: ConnectionTrait>(
    db: &C,
    location_id: Option<Uuid>,
) -> Result<(), AssetdeskError> {
    if let Some(id) = location_id {
        if Location::Entity::find_by_id(id).one(db).await?.is_none() {
            return Err(AssetdeskError::LocationNotFound(id));
        }
    }
    Ok(())
}

pub async fn create_staff<C: ConnectionTrait>(
    db: &C,
    actor: &str,
    fields: StaffFields,
) -> Result<Staff::Model, AssetdeskError> {
    ensure_location(db, fields.location_id).await?;

    let now = Utc::now();
    let values = Staff::ActiveModel {
        id: Set(Uuid::new_v4()),
        staff_id: Set(fields.staff_id.trim().to_owned()),
        name: Set(fields.name),
        position: Set(normalize_text(fields.position.as_deref())),
        email: Set(normalize_text(fields.email.as_deref())),
        phone: Set(normalize_text(fields.phone.as_deref())),
        location_id: Set(fields.location_id),
        created_at: Set(now),
        updated_at: Set(now),
    };

    let staff = values
        .insert(db)
        .await
        .map_err(|e| AssetdeskError::from_write(e, &[DuplicateKey::StaffId]))?;

    info!(staff = %staff.id, staff_id = %staff.staff_id, %actor, "Staff member created");
    record_staff_created(db, &staff, actor).await;

    Ok(staff)
}

/// Returns `None` if the staff member does not exist. A location change is
/// recorded with the optional `effective_date`.
pub async fn update_staff<C: ConnectionTrait>(
    db: &C,
    actor: &str,
    id: Uuid,
    fields: StaffFields,
    effective_date: Option<NaiveDate>,
) -> Result<Option<Staff::Model>, AssetdeskError> {
    let Some(staff) = Staff::Entity::find_by_id(id).one(db).await? else {
        return Ok(None);
    };
    ensure_location(db, fields.location_id).await?;

    let old = StaffSnapshot::from(&staff);

    let mut model: Staff::ActiveModel = staff.into();
    model.staff_id = Set(fields.staff_id.trim().to_owned());
    model.name = Set(fields.name);
    model.position = Set(normalize_text(fields.position.as_deref()));
    model.email = Set(normalize_text(fields.email.as_deref()));
    model.phone = Set(normalize_text(fields.phone.as_deref()));
    model.location_id = Set(fields.location_id);
    model.updated_at = Set(Utc::now());

    let staff = model
        .update(db)
        .await
        .map_err(|e| AssetdeskError::from_write(e, &[DuplicateKey::StaffId]))?;

    let new = StaffSnapshot::from(&staff);
    if old != new {
        match load_display_names(
            db,
            [],
            [],
            [old.location_id, new.location_id].into_iter().flatten(),
        )
        .await
        {
            Ok(names) => {
                let changes = diff_staff(&old, &new, &names, effective_date);
                record_staff_changes(db, staff.id, &changes, actor).await;
            }
            Err(error) => {
                error!(staff = %staff.id, ?error, "Failed to resolve names for staff history");
            }
        }
    }

    Ok(Some(staff))
}

#[cfg(test)]
mod tests {
    use assetdesk_db_entities::{ChangeType, StaffHistory};
    use sea_orm::{ColumnTrait, QueryFilter, QueryOrder};

    use super::*;
    use crate::history::{FIELD_LOCATION, FIELD_STAFF_ID};
    use crate::test_helpers::{insert_location, memory_db};

    fn alice() -> StaffFields {
        StaffFields {
            staff_id: "S-001".into(),
            name: "Alice".into(),
            ..Default::default()
        }
    }

    async fn history_of<C: ConnectionTrait>(db: &C, staff_id: Uuid) -> Vec<StaffHistory::Model> {
        StaffHistory::Entity::find()
            .filter(StaffHistory::Column::StaffId.eq(staff_id))
            .order_by_asc(StaffHistory::Column::CreatedAt)
            .all(db)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn create_records_the_staff_id() {
        let db = memory_db().await;
        let staff = create_staff(&db, "admin", alice()).await.unwrap();

        let history = history_of(&db, staff.id).await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].change_type, ChangeType::Create);
        assert_eq!(history[0].field_name, FIELD_STAFF_ID);
        assert_eq!(history[0].new_value.as_deref(), Some("S-001"));
    }

    #[tokio::test]
    async fn duplicate_staff_id_is_rejected() {
        let db = memory_db().await;
        create_staff(&db, "admin", alice()).await.unwrap();
        let err = create_staff(
            &db,
            "admin",
            StaffFields {
                name: "Another Alice".into(),
                ..alice()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AssetdeskError::Duplicate(DuplicateKey::StaffId)));
    }

    #[tokio::test]
    async fn only_location_moves_are_tracked() {
        let db = memory_db().await;
        let hq = insert_location(&db, "HQ").await;
        let branch = insert_location(&db, "Branch").await;

        let staff = create_staff(
            &db,
            "admin",
            StaffFields {
                location_id: Some(hq.id),
                ..alice()
            },
        )
        .await
        .unwrap();

        update_staff(
            &db,
            "admin",
            staff.id,
            StaffFields {
                position: Some("Engineer".into()),
                location_id: Some(hq.id),
                ..alice()
            },
            None,
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(history_of(&db, staff.id).await.len(), 1);

        let moved_on = NaiveDate::from_ymd_opt(2024, 3, 1);
        update_staff(
            &db,
            "admin",
            staff.id,
            StaffFields {
                location_id: Some(branch.id),
                ..alice()
            },
            moved_on,
        )
        .await
        .unwrap()
        .unwrap();

        let history = history_of(&db, staff.id).await;
        assert_eq!(history.len(), 2);
        let moved = history
            .iter()
            .find(|h| h.field_name == FIELD_LOCATION)
            .unwrap();
        assert_eq!(moved.old_value.as_deref(), Some("HQ"));
        assert_eq!(moved.new_value.as_deref(), Some("Branch"));
        assert_eq!(moved.effective_date, moved_on);
    }

    #[tokio::test]
    async fn unknown_location_is_rejected() {
        let db = memory_db().await;
        let missing = Uuid::new_v4();
        let err = create_staff(
            &db,
            "admin",
            StaffFields {
                location_id: Some(missing),
                ..alice()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AssetdeskError::LocationNotFound(id) if id == missing));
    }

    #[tokio::test]
    async fn missing_staff_member_yields_none() {
        let db = memory_db().await;
        let result = update_staff(&db, "admin", Uuid::new_v4(), alice(), None)
            .await
            .unwrap();
        assert!(result.is_none());
    }
}
