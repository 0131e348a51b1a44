use assetdesk_common::{AssetdeskError, DuplicateKey};
use assetdesk_db_entities::Category;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, Set};
use tracing::*;
use uuid::Uuid;

use crate::consts::MAX_CATEGORY_CODE_LENGTH;
use crate::history::normalize_text;

const CATEGORY_KEYS: &[DuplicateKey] = &[DuplicateKey::CategoryCode, DuplicateKey::CategoryName];

#[derive(Debug, Clone, Default)]
pub struct CategoryFields {
    pub name: String,
    /// Middle segment of generated asset names
    pub code: String,
    pub description: Option<String>,
}

/// Returns a message describing why `code` cannot be used, if it can't.
pub fn validate_category_code(code: &str) -> Option<String> {
    let code = code.trim();
    if code.chars().count() > MAX_CATEGORY_CODE_LENGTH {
        return Some(format!(
            "code must be at most {MAX_CATEGORY_CODE_LENGTH} characters"
        ));
    }
    if code.contains(['\\', '%', '_']) {
        return Some("code must not contain '\\', '%' or '_'".to_owned());
    }
    None
}

pub async fn create_category<C: ConnectionTrait>(
    db: &C,
    fields: CategoryFields,
) -> Result<Category::Model, AssetdeskError> {
    let values = Category::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(fields.name.trim().to_owned()),
        code: Set(fields.code.trim().to_owned()),
        description: Set(normalize_text(fields.description.as_deref())),
        created_at: Set(Utc::now()),
    };

    let category = values
        .insert(db)
        .await
        .map_err(|e| AssetdeskError::from_write(e, CATEGORY_KEYS))?;

    info!(category = %category.id, code = %category.code, "Category created");
    Ok(category)
}

/// Returns `None` if the category does not exist. Existing asset names keep
/// the old code.
pub async fn update_category<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    fields: CategoryFields,
) -> Result<Option<Category::Model>, AssetdeskError> {
    let Some(category) = Category::Entity::find_by_id(id).one(db).await? else {
        return Ok(None);
    };

    let mut model: Category::ActiveModel = category.into();
    model.name = Set(fields.name.trim().to_owned());
    model.code = Set(fields.code.trim().to_owned());
    model.description = Set(normalize_text(fields.description.as_deref()));

    let category = model
        .update(db)
        .await
        .map_err(|e| AssetdeskError::from_write(e, CATEGORY_KEYS))?;

    Ok(Some(category))
}
