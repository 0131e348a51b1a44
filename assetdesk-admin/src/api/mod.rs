use assetdesk_common::AssetdeskError;
use poem_openapi::OpenApi;

pub mod assets;
pub mod categories;
pub mod info;
pub mod licenses;
pub mod locations;
mod pagination;
pub mod reports;
pub mod staff;

pub fn get() -> impl OpenApi {
    (
        info::Api,
        categories::ListApi,
        categories::DetailApi,
        locations::ListApi,
        locations::DetailApi,
        staff::ListApi,
        staff::DetailApi,
        assets::ListApi,
        assets::DetailApi,
        licenses::ListApi,
        licenses::DetailApi,
        reports::Api,
    )
}

/// A write that the client can fix, as opposed to a server-side failure.
pub(crate) enum Rejection {
    Conflict(String),
    BadRequest(String),
}

impl Rejection {
    pub(crate) fn from_error(error: AssetdeskError) -> Result<Self, AssetdeskError> {
        match error {
            AssetdeskError::Duplicate(key) => Ok(Self::Conflict(key.message().to_owned())),
            error @ (AssetdeskError::CategoryNotFound(_)
            | AssetdeskError::StaffNotFound(_)
            | AssetdeskError::LocationNotFound(_)
            | AssetdeskError::MissingCategoryCode) => Ok(Self::BadRequest(error.to_string())),
            error => Err(error),
        }
    }
}

/// Turns an empty or whitespace-only request field into a 400 message.
pub(crate) fn require(field: &str, value: &str) -> Option<String> {
    value.trim().is_empty().then(|| format!("{field} is required"))
}

pub(crate) fn like_pattern(search: &str) -> String {
    format!("%{}%", search.trim())
}

#[cfg(test)]
mod tests {
    use assetdesk_common::DuplicateKey;
    use uuid::Uuid;

    use super::*;

    #[test]
    fn duplicates_become_conflicts() {
        let rejection =
            Rejection::from_error(AssetdeskError::Duplicate(DuplicateKey::LicenseKey));
        assert!(
            matches!(rejection, Ok(Rejection::Conflict(m)) if m == "License key already exists")
        );
    }

    #[test]
    fn missing_references_are_bad_requests() {
        let rejection = Rejection::from_error(AssetdeskError::StaffNotFound(Uuid::nil()));
        assert!(matches!(rejection, Ok(Rejection::BadRequest(_))));
    }

    #[test]
    fn database_errors_pass_through() {
        let rejection = Rejection::from_error(AssetdeskError::DatabaseError(
            sea_orm::DbErr::Custom("boom".into()),
        ));
        assert!(matches!(rejection, Err(AssetdeskError::DatabaseError(_))));
    }

    #[test]
    fn blank_fields_are_required() {
        assert_eq!(require("name", "  "), Some("name is required".into()));
        assert_eq!(require("name", "Laptops"), None);
    }
}
