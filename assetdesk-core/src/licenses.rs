use assetdesk_common::{AssetdeskError, DuplicateKey};
use assetdesk_db_entities::License;
use chrono::{NaiveDate, Utc};
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, Set};
use tracing::*;
use uuid::Uuid;

use crate::history::normalize_text;

#[derive(Debug, Clone, Default)]
pub struct LicenseFields {
    pub name: String,
    pub license_key: String,
    pub license_type: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub expiration_date: Option<NaiveDate>,
    pub seats_total: i32,
    pub seats_used: i32,
    pub cost: Option<f64>,
    pub notes: Option<String>,
}

impl LicenseFields {
    fn apply(self, model: &mut License::ActiveModel) {
        model.name = Set(self.name.trim().to_owned());
        model.license_key = Set(self.license_key.trim().to_owned());
        model.license_type = Set(normalize_text(self.license_type.as_deref()));
        model.purchase_date = Set(self.purchase_date);
        model.expiration_date = Set(self.expiration_date);
        model.seats_total = Set(self.seats_total);
        model.seats_used = Set(self.seats_used);
        model.cost = Set(self.cost);
        model.notes = Set(normalize_text(self.notes.as_deref()));
        model.updated_at = Set(Utc::now());
    }
}

pub async fn create_license<C: ConnectionTrait>(
    db: &C,
    fields: LicenseFields,
) -> Result<License::Model, AssetdeskError> {
    let mut values = License::ActiveModel {
        id: Set(Uuid::new_v4()),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    fields.apply(&mut values);

    let license = values
        .insert(db)
        .await
        .map_err(|e| AssetdeskError::from_write(e, &[DuplicateKey::LicenseKey]))?;

    info!(license = %license.id, name = %license.name, "License created");
    Ok(license)
}

/// Returns `None` if the license does not exist.
pub async fn update_license<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    fields: LicenseFields,
) -> Result<Option<License::Model>, AssetdeskError> {
    let Some(license) = License::Entity::find_by_id(id).one(db).await? else {
        return Ok(None);
    };

    let mut model: License::ActiveModel = license.into();
    fields.apply(&mut model);

    let license = model
        .update(db)
        .await
        .map_err(|e| AssetdeskError::from_write(e, &[DuplicateKey::LicenseKey]))?;

    Ok(Some(license))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::memory_db;

    fn office() -> LicenseFields {
        LicenseFields {
            name: "Office".into(),
            license_key: "KEY-0001".into(),
            seats_total: 10,
            seats_used: 3,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn duplicate_license_key_is_rejected() {
        let db = memory_db().await;
        let original = create_license(&db, office()).await.unwrap();

        let err = create_license(
            &db,
            LicenseFields {
                name: "Office copy".into(),
                license_key: " KEY-0001 ".into(),
                seats_total: 1,
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AssetdeskError::Duplicate(DuplicateKey::LicenseKey)));
        assert_eq!(err.to_string(), "License key already exists");

        let stored = License::Entity::find().all(&db).await.unwrap();
        assert_eq!(stored, vec![original]);
    }

    #[tokio::test]
    async fn update_onto_another_key_is_rejected() {
        let db = memory_db().await;
        let office = create_license(&db, office()).await.unwrap();
        let editor = create_license(
            &db,
            LicenseFields {
                name: "Editor".into(),
                license_key: "KEY-0002".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let err = update_license(
            &db,
            editor.id,
            LicenseFields {
                name: "Editor".into(),
                license_key: "KEY-0001".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AssetdeskError::Duplicate(DuplicateKey::LicenseKey)));

        let reread = License::Entity::find_by_id(editor.id).one(&db).await.unwrap();
        assert_eq!(reread, Some(editor));
        let reread = License::Entity::find_by_id(office.id).one(&db).await.unwrap();
        assert_eq!(reread, Some(office));
    }

    #[tokio::test]
    async fn update_replaces_fields() {
        let db = memory_db().await;
        let license = create_license(&db, office()).await.unwrap();

        let updated = update_license(
            &db,
            license.id,
            LicenseFields {
                seats_used: 12,
                notes: Some("renewed".into()),
                license_type: Some("".into()),
                ..office()
            },
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(updated.seats_used, 12);
        assert_eq!(updated.notes.as_deref(), Some("renewed"));
        assert_eq!(updated.license_type, None);
        assert_eq!(updated.created_at, license.created_at);
    }

    #[tokio::test]
    async fn missing_license_yields_none() {
        let db = memory_db().await;
        let result = update_license(&db, Uuid::new_v4(), office()).await.unwrap();
        assert!(result.is_none());
    }
}
