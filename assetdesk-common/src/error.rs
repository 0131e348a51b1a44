use std::error::Error;

use poem::error::ResponseError;
use sea_orm::{DbErr, SqlErr};
use uuid::Uuid;

/// Columns guarded by a unique index, as surfaced to API clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateKey {
    AssetName,
    SerialNumber,
    LicenseKey,
    StaffId,
    CategoryCode,
    CategoryName,
}

impl DuplicateKey {
    pub fn message(&self) -> &'static str {
        match self {
            Self::AssetName => "Asset name already exists",
            Self::SerialNumber => "Serial number already exists",
            Self::LicenseKey => "License key already exists",
            Self::StaffId => "Staff ID already exists",
            Self::CategoryCode => "Category code already exists",
            Self::CategoryName => "Category name already exists",
        }
    }

    // `table.column` is what SQLite reports, `table_column_...` matches the
    // constraint names Postgres and MySQL put in theirs.
    fn markers(&self) -> &'static [&'static str] {
        match self {
            Self::AssetName => &["assets.name", "assets_name_"],
            Self::SerialNumber => &["assets.serial_number", "assets_serial_number_"],
            Self::LicenseKey => &["licenses.license_key", "licenses_license_key_"],
            Self::StaffId => &["staff.staff_id", "staff_staff_id_"],
            Self::CategoryCode => &["categories.code", "categories_code_"],
            Self::CategoryName => &["categories.name", "categories_name_"],
        }
    }

    /// Returns the violated key if `err` is a unique constraint violation on
    /// one of `candidates`. Violations the message does not attribute to any
    /// of them yield `None`.
    pub fn from_db_err(err: &DbErr, candidates: &[DuplicateKey]) -> Option<DuplicateKey> {
        let Some(SqlErr::UniqueConstraintViolation(message)) = err.sql_err() else {
            return None;
        };
        Self::from_violation_message(&message, candidates)
    }

    pub fn from_violation_message(
        message: &str,
        candidates: &[DuplicateKey],
    ) -> Option<DuplicateKey> {
        candidates
            .iter()
            .find(|key| key.markers().iter().any(|m| message.contains(m)))
            .copied()
    }
}

impl std::fmt::Display for DuplicateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

#[derive(thiserror::Error, Debug)]
pub enum AssetdeskError {
    #[error("database error: {0}")]
    DatabaseError(#[from] DbErr),
    #[error("{0}")]
    Duplicate(DuplicateKey),
    #[error("category {0} not found")]
    CategoryNotFound(Uuid),
    #[error("staff member {0} not found")]
    StaffNotFound(Uuid),
    #[error("location {0} not found")]
    LocationNotFound(Uuid),
    #[error("an asset name can only be generated for an asset with a category")]
    MissingCategoryCode,
    #[error("deserialization failed: {0}")]
    DeserializeJson(#[from] serde_json::Error),
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
    #[error(transparent)]
    Other(Box<dyn Error + Send + Sync>),
}

impl ResponseError for AssetdeskError {
    fn status(&self) -> poem::http::StatusCode {
        match self {
            Self::Duplicate(_) => poem::http::StatusCode::CONFLICT,
            Self::CategoryNotFound(_)
            | Self::StaffNotFound(_)
            | Self::LocationNotFound(_)
            | Self::MissingCategoryCode => poem::http::StatusCode::BAD_REQUEST,
            _ => poem::http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl poem_openapi::ApiResponse for AssetdeskError {
    fn meta() -> poem_openapi::registry::MetaResponses {
        poem_openapi::registry::MetaResponses { responses: vec![] }
    }

    fn register(_registry: &mut poem_openapi::registry::Registry) {}
}

impl AssetdeskError {
    pub fn other<E: Error + Send + Sync + 'static>(err: E) -> Self {
        Self::Other(Box::new(err))
    }

    /// Converts a failed write into [`AssetdeskError::Duplicate`] when it hit one of `keys`.
    pub fn from_write(err: DbErr, keys: &[DuplicateKey]) -> Self {
        match DuplicateKey::from_db_err(&err, keys) {
            Some(key) => Self::Duplicate(key),
            None => Self::DatabaseError(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlite_messages_pick_the_named_column() {
        let keys = [DuplicateKey::AssetName, DuplicateKey::SerialNumber];
        assert_eq!(
            DuplicateKey::from_violation_message(
                "UNIQUE constraint failed: assets.serial_number",
                &keys
            ),
            Some(DuplicateKey::SerialNumber)
        );
        assert_eq!(
            DuplicateKey::from_violation_message("UNIQUE constraint failed: assets.name", &keys),
            Some(DuplicateKey::AssetName)
        );
    }

    #[test]
    fn postgres_constraint_names_are_recognised() {
        let keys = [DuplicateKey::CategoryName, DuplicateKey::CategoryCode];
        assert_eq!(
            DuplicateKey::from_violation_message(
                "duplicate key value violates unique constraint \"categories_code_key\"",
                &keys
            ),
            Some(DuplicateKey::CategoryCode)
        );
    }

    #[test]
    fn unattributed_violations_are_not_duplicates() {
        assert_eq!(
            DuplicateKey::from_violation_message(
                "UNIQUE constraint failed: assets.id",
                &[DuplicateKey::AssetName, DuplicateKey::SerialNumber]
            ),
            None
        );
        assert_eq!(
            DuplicateKey::from_violation_message(
                "UNIQUE constraint failed: licenses.license_key",
                &[DuplicateKey::AssetName]
            ),
            None
        );
        assert_eq!(DuplicateKey::from_violation_message("something odd", &[]), None);
    }

    #[test]
    fn non_unique_errors_are_passed_through() {
        let err = AssetdeskError::from_write(
            DbErr::Custom("boom".into()),
            &[DuplicateKey::AssetName],
        );
        assert!(matches!(err, AssetdeskError::DatabaseError(_)));
    }
}
