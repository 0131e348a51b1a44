use std::sync::Arc;

use assetdesk_common::api::TokenSecurityScheme;
use assetdesk_common::AssetdeskError;
use assetdesk_core::licenses::{create_license, update_license, LicenseFields};
use assetdesk_db_entities::License;
use chrono::NaiveDate;
use poem::web::Data;
use poem_openapi::param::{Path, Query};
use poem_openapi::payload::Json;
use poem_openapi::{ApiResponse, Object, OpenApi};
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter, QueryOrder,
};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{like_pattern, require, Rejection};

#[derive(Object)]
struct LicenseDataRequest {
    name: String,
    license_key: String,
    license_type: Option<String>,
    purchase_date: Option<NaiveDate>,
    expiration_date: Option<NaiveDate>,
    #[oai(default)]
    seats_total: i32,
    #[oai(default)]
    seats_used: i32,
    cost: Option<f64>,
    notes: Option<String>,
}

impl LicenseDataRequest {
    fn validate(&self) -> Option<String> {
        require("name", &self.name)
            .or_else(|| require("license_key", &self.license_key))
            .or_else(|| {
                (self.seats_total < 0 || self.seats_used < 0)
                    .then(|| "seat counts must not be negative".to_owned())
            })
    }

    fn fields(&self) -> LicenseFields {
        LicenseFields {
            name: self.name.clone(),
            license_key: self.license_key.clone(),
            license_type: self.license_type.clone(),
            purchase_date: self.purchase_date,
            expiration_date: self.expiration_date,
            seats_total: self.seats_total,
            seats_used: self.seats_used,
            cost: self.cost,
            notes: self.notes.clone(),
        }
    }
}

#[derive(ApiResponse)]
enum GetLicensesResponse {
    #[oai(status = 200)]
    Ok(Json<Vec<License::Model>>),
}

#[derive(ApiResponse)]
enum CreateLicenseResponse {
    #[oai(status = 201)]
    Created(Json<License::Model>),
    #[oai(status = 400)]
    BadRequest(Json<String>),
    #[oai(status = 409)]
    Conflict(Json<String>),
}

pub struct ListApi;

#[OpenApi]
impl ListApi {
    #[oai(path = "/licenses", method = "get", operation_id = "get_licenses")]
    async fn api_get_all_licenses(
        &self,
        db: Data<&Arc<Mutex<DatabaseConnection>>>,
        search: Query<Option<String>>,
        _sec_scheme: TokenSecurityScheme,
    ) -> Result<GetLicensesResponse, AssetdeskError> {
        let db = db.lock().await;

        let mut licenses = License::Entity::find().order_by_asc(License::Column::Name);

        if let Some(ref search) = *search {
            let search = like_pattern(search);
            licenses = licenses.filter(
                Condition::any()
                    .add(License::Column::Name.like(&search))
                    .add(License::Column::LicenseKey.like(&search))
                    .add(License::Column::LicenseType.like(&search)),
            );
        }

        let licenses = licenses.all(&*db).await?;
        Ok(GetLicensesResponse::Ok(Json(licenses)))
    }

    #[oai(path = "/licenses", method = "post", operation_id = "create_license")]
    async fn api_create_license(
        &self,
        db: Data<&Arc<Mutex<DatabaseConnection>>>,
        body: Json<LicenseDataRequest>,
        _sec_scheme: TokenSecurityScheme,
    ) -> Result<CreateLicenseResponse, AssetdeskError> {
        if let Some(message) = body.validate() {
            return Ok(CreateLicenseResponse::BadRequest(Json(message)));
        }

        let db = db.lock().await;

        match create_license(&*db, body.fields()).await {
            Ok(license) => Ok(CreateLicenseResponse::Created(Json(license))),
            Err(error) => match Rejection::from_error(error)? {
                Rejection::Conflict(m) => Ok(CreateLicenseResponse::Conflict(Json(m))),
                Rejection::BadRequest(m) => Ok(CreateLicenseResponse::BadRequest(Json(m))),
            },
        }
    }
}

#[derive(ApiResponse)]
enum GetLicenseResponse {
    #[oai(status = 200)]
    Ok(Json<License::Model>),
    #[oai(status = 404)]
    NotFound,
}

#[derive(ApiResponse)]
enum UpdateLicenseResponse {
    #[oai(status = 200)]
    Ok(Json<License::Model>),
    #[oai(status = 400)]
    BadRequest(Json<String>),
    #[oai(status = 404)]
    NotFound,
    #[oai(status = 409)]
    Conflict(Json<String>),
}

#[derive(ApiResponse)]
enum DeleteLicenseResponse {
    #[oai(status = 204)]
    Deleted,
    #[oai(status = 404)]
    NotFound,
}

pub struct DetailApi;

#[OpenApi]
impl DetailApi {
    #[oai(path = "/licenses/:id", method = "get", operation_id = "get_license")]
    async fn api_get_license(
        &self,
        db: Data<&Arc<Mutex<DatabaseConnection>>>,
        id: Path<Uuid>,
        _sec_scheme: TokenSecurityScheme,
    ) -> Result<GetLicenseResponse, AssetdeskError> {
        let db = db.lock().await;

        Ok(match License::Entity::find_by_id(id.0).one(&*db).await? {
            Some(license) => GetLicenseResponse::Ok(Json(license)),
            None => GetLicenseResponse::NotFound,
        })
    }

    #[oai(path = "/licenses/:id", method = "put", operation_id = "update_license")]
    async fn api_update_license(
        &self,
        db: Data<&Arc<Mutex<DatabaseConnection>>>,
        body: Json<LicenseDataRequest>,
        id: Path<Uuid>,
        _sec_scheme: TokenSecurityScheme,
    ) -> Result<UpdateLicenseResponse, AssetdeskError> {
        if let Some(message) = body.validate() {
            return Ok(UpdateLicenseResponse::BadRequest(Json(message)));
        }

        let db = db.lock().await;

        match update_license(&*db, id.0, body.fields()).await {
            Ok(Some(license)) => Ok(UpdateLicenseResponse::Ok(Json(license))),
            Ok(None) => Ok(UpdateLicenseResponse::NotFound),
            Err(error) => match Rejection::from_error(error)? {
                Rejection::Conflict(m) => Ok(UpdateLicenseResponse::Conflict(Json(m))),
                Rejection::BadRequest(m) => Ok(UpdateLicenseResponse::BadRequest(Json(m))),
            },
        }
    }

    #[oai(path = "/licenses/:id", method = "delete", operation_id = "delete_license")]
    async fn api_delete_license(
        &self,
        db: Data<&Arc<Mutex<DatabaseConnection>>>,
        id: Path<Uuid>,
        _sec_scheme: TokenSecurityScheme,
    ) -> Result<DeleteLicenseResponse, AssetdeskError> {
        let db = db.lock().await;

        let Some(license) = License::Entity::find_by_id(id.0).one(&*db).await? else {
            return Ok(DeleteLicenseResponse::NotFound);
        };

        license.delete(&*db).await?;
        Ok(DeleteLicenseResponse::Deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(total: i32, used: i32) -> LicenseDataRequest {
        LicenseDataRequest {
            name: "Office".into(),
            license_key: "KEY-1".into(),
            license_type: None,
            purchase_date: None,
            expiration_date: None,
            seats_total: total,
            seats_used: used,
            cost: None,
            notes: None,
        }
    }

    #[test]
    fn negative_seats_are_rejected() {
        assert_eq!(request(5, 2).validate(), None);
        assert!(request(-1, 0).validate().is_some());
        assert!(request(5, -2).validate().is_some());
    }

    #[test]
    fn over_allocation_is_allowed() {
        assert_eq!(request(5, 7).validate(), None);
    }
}
