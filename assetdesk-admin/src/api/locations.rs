use std::sync::Arc;

use assetdesk_common::api::TokenSecurityScheme;
use assetdesk_common::AssetdeskError;
use assetdesk_db_entities::Location;
use chrono::Utc;
use poem::web::Data;
use poem_openapi::param::{Path, Query};
use poem_openapi::payload::Json;
use poem_openapi::{ApiResponse, Object, OpenApi};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set,
};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{like_pattern, require};

#[derive(Object)]
struct LocationDataRequest {
    name: String,
}

#[derive(ApiResponse)]
enum GetLocationsResponse {
    #[oai(status = 200)]
    Ok(Json<Vec<Location::Model>>),
}

#[derive(ApiResponse)]
enum CreateLocationResponse {
    #[oai(status = 201)]
    Created(Json<Location::Model>),
    #[oai(status = 400)]
    BadRequest(Json<String>),
}

pub struct ListApi;

#[OpenApi]
impl ListApi {
    #[oai(path = "/locations", method = "get", operation_id = "get_locations")]
    async fn api_get_all_locations(
        &self,
        db: Data<&Arc<Mutex<DatabaseConnection>>>,
        search: Query<Option<String>>,
        _sec_scheme: TokenSecurityScheme,
    ) -> Result<GetLocationsResponse, AssetdeskError> {
        let db = db.lock().await;

        let mut locations = Location::Entity::find().order_by_asc(Location::Column::Name);

        if let Some(ref search) = *search {
            locations = locations.filter(Location::Column::Name.like(like_pattern(search)));
        }

        let locations = locations.all(&*db).await?;
        Ok(GetLocationsResponse::Ok(Json(locations)))
    }

    #[oai(path = "/locations", method = "post", operation_id = "create_location")]
    async fn api_create_location(
        &self,
        db: Data<&Arc<Mutex<DatabaseConnection>>>,
        body: Json<LocationDataRequest>,
        _sec_scheme: TokenSecurityScheme,
    ) -> Result<CreateLocationResponse, AssetdeskError> {
        if let Some(message) = require("name", &body.name) {
            return Ok(CreateLocationResponse::BadRequest(Json(message)));
        }

        let db = db.lock().await;

        let values = Location::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(body.name.trim().to_owned()),
            created_at: Set(Utc::now()),
        };

        let location = values.insert(&*db).await?;
        Ok(CreateLocationResponse::Created(Json(location)))
    }
}

#[derive(ApiResponse)]
enum GetLocationResponse {
    #[oai(status = 200)]
    Ok(Json<Location::Model>),
    #[oai(status = 404)]
    NotFound,
}

#[derive(ApiResponse)]
enum UpdateLocationResponse {
    #[oai(status = 200)]
    Ok(Json<Location::Model>),
    #[oai(status = 400)]
    BadRequest(Json<String>),
    #[oai(status = 404)]
    NotFound,
}

#[derive(ApiResponse)]
enum DeleteLocationResponse {
    #[oai(status = 204)]
    Deleted,
    #[oai(status = 404)]
    NotFound,
}

pub struct DetailApi;

#[OpenApi]
impl DetailApi {
    #[oai(path = "/locations/:id", method = "get", operation_id = "get_location")]
    async fn api_get_location(
        &self,
        db: Data<&Arc<Mutex<DatabaseConnection>>>,
        id: Path<Uuid>,
        _sec_scheme: TokenSecurityScheme,
    ) -> Result<GetLocationResponse, AssetdeskError> {
        let db = db.lock().await;

        Ok(match Location::Entity::find_by_id(id.0).one(&*db).await? {
            Some(location) => GetLocationResponse::Ok(Json(location)),
            None => GetLocationResponse::NotFound,
        })
    }

    #[oai(path = "/locations/:id", method = "put", operation_id = "update_location")]
    async fn api_update_location(
        &self,
        db: Data<&Arc<Mutex<DatabaseConnection>>>,
        body: Json<LocationDataRequest>,
        id: Path<Uuid>,
        _sec_scheme: TokenSecurityScheme,
    ) -> Result<UpdateLocationResponse, AssetdeskError> {
        if let Some(message) = require("name", &body.name) {
            return Ok(UpdateLocationResponse::BadRequest(Json(message)));
        }

        let db = db.lock().await;

        let Some(location) = Location::Entity::find_by_id(id.0).one(&*db).await? else {
            return Ok(UpdateLocationResponse::NotFound);
        };

        let mut model: Location::ActiveModel = location.into();
        model.name = Set(body.name.trim().to_owned());
        let location = model.update(&*db).await?;

        Ok(UpdateLocationResponse::Ok(Json(location)))
    }

    /// Staff at the location keep their records with no location.
    #[oai(path = "/locations/:id", method = "delete", operation_id = "delete_location")]
    async fn api_delete_location(
        &self,
        db: Data<&Arc<Mutex<DatabaseConnection>>>,
        id: Path<Uuid>,
        _sec_scheme: TokenSecurityScheme,
    ) -> Result<DeleteLocationResponse, AssetdeskError> {
        let db = db.lock().await;

        let Some(location) = Location::Entity::find_by_id(id.0).one(&*db).await? else {
            return Ok(DeleteLocationResponse::NotFound);
        };

        location.delete(&*db).await?;
        Ok(DeleteLocationResponse::Deleted)
    }
}
