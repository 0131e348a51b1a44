use std::sync::Arc;

use assetdesk_common::api::{RequestAuthorization, TokenSecurityScheme};
use assetdesk_common::AssetdeskError;
use assetdesk_core::staff::{create_staff, update_staff, StaffFields};
use assetdesk_db_entities::{Staff, StaffHistory};
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

use super::pagination::{PaginatedResponse, PaginationParams};
use super::{like_pattern, require, Rejection};

#[derive(Object)]
struct StaffDataRequest {
    staff_id: String,
    name: String,
    position: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    location_id: Option<Uuid>,
    /// When a location change actually took effect, if not today
    effective_date: Option<NaiveDate>,
}

impl StaffDataRequest {
    fn validate(&self) -> Option<String> {
        require("staff_id", &self.staff_id).or_else(|| require("name", &self.name))
    }

    fn fields(&self) -> StaffFields {
        StaffFields {
            staff_id: self.staff_id.clone(),
            name: self.name.trim().to_owned(),
            position: self.position.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            location_id: self.location_id,
        }
    }
}

#[derive(ApiResponse)]
enum GetStaffListResponse {
    #[oai(status = 200)]
    Ok(Json<Vec<Staff::Model>>),
}

#[derive(ApiResponse)]
enum CreateStaffResponse {
    #[oai(status = 201)]
    Created(Json<Staff::Model>),
    #[oai(status = 400)]
    BadRequest(Json<String>),
    #[oai(status = 409)]
    Conflict(Json<String>),
}

pub struct ListApi;

#[OpenApi]
impl ListApi {
    #[oai(path = "/staff", method = "get", operation_id = "get_staff_list")]
    async fn api_get_all_staff(
        &self,
        db: Data<&Arc<Mutex<DatabaseConnection>>>,
        search: Query<Option<String>>,
        location_id: Query<Option<Uuid>>,
        _sec_scheme: TokenSecurityScheme,
    ) -> Result<GetStaffListResponse, AssetdeskError> {
        let db = db.lock().await;

        let mut staff = Staff::Entity::find().order_by_asc(Staff::Column::Name);

        if let Some(ref search) = *search {
            let search = like_pattern(search);
            staff = staff.filter(
                Condition::any()
                    .add(Staff::Column::Name.like(&search))
                    .add(Staff::Column::StaffId.like(&search))
                    .add(Staff::Column::Email.like(&search)),
            );
        }
        if let Some(location_id) = *location_id {
            staff = staff.filter(Staff::Column::LocationId.eq(location_id));
        }

        let staff = staff.all(&*db).await?;
        Ok(GetStaffListResponse::Ok(Json(staff)))
    }

    #[oai(path = "/staff", method = "post", operation_id = "create_staff")]
    async fn api_create_staff(
        &self,
        db: Data<&Arc<Mutex<DatabaseConnection>>>,
        auth: Data<&RequestAuthorization>,
        body: Json<StaffDataRequest>,
        _sec_scheme: TokenSecurityScheme,
    ) -> Result<CreateStaffResponse, AssetdeskError> {
        if let Some(message) = body.validate() {
            return Ok(CreateStaffResponse::BadRequest(Json(message)));
        }

        let db = db.lock().await;

        match create_staff(&*db, auth.actor(), body.fields()).await {
            Ok(staff) => Ok(CreateStaffResponse::Created(Json(staff))),
            Err(error) => match Rejection::from_error(error)? {
                Rejection::Conflict(m) => Ok(CreateStaffResponse::Conflict(Json(m))),
                Rejection::BadRequest(m) => Ok(CreateStaffResponse::BadRequest(Json(m))),
            },
        }
    }
}

#[derive(ApiResponse)]
enum GetStaffResponse {
    #[oai(status = 200)]
    Ok(Json<Staff::Model>),
    #[oai(status = 404)]
    NotFound,
}

#[derive(ApiResponse)]
enum UpdateStaffResponse {
    #[oai(status = 200)]
    Ok(Json<Staff::Model>),
    #[oai(status = 400)]
    BadRequest(Json<String>),
    #[oai(status = 404)]
    NotFound,
    #[oai(status = 409)]
    Conflict(Json<String>),
}

#[derive(ApiResponse)]
enum DeleteStaffResponse {
    #[oai(status = 204)]
    Deleted,
    #[oai(status = 404)]
    NotFound,
}

#[derive(ApiResponse)]
enum GetStaffHistoryResponse {
    #[oai(status = 200)]
    Ok(Json<PaginatedResponse<StaffHistory::Model>>),
    #[oai(status = 404)]
    NotFound,
}

pub struct DetailApi;

#[OpenApi]
impl DetailApi {
    #[oai(path = "/staff/:id", method = "get", operation_id = "get_staff")]
    async fn api_get_staff(
        &self,
        db: Data<&Arc<Mutex<DatabaseConnection>>>,
        id: Path<Uuid>,
        _sec_scheme: TokenSecurityScheme,
    ) -> Result<GetStaffResponse, AssetdeskError> {
        let db = db.lock().await;

        Ok(match Staff::Entity::find_by_id(id.0).one(&*db).await? {
            Some(staff) => GetStaffResponse::Ok(Json(staff)),
            None => GetStaffResponse::NotFound,
        })
    }

    #[oai(path = "/staff/:id", method = "put", operation_id = "update_staff")]
    async fn api_update_staff(
        &self,
        db: Data<&Arc<Mutex<DatabaseConnection>>>,
        auth: Data<&RequestAuthorization>,
        body: Json<StaffDataRequest>,
        id: Path<Uuid>,
        _sec_scheme: TokenSecurityScheme,
    ) -> Result<UpdateStaffResponse, AssetdeskError> {
        if let Some(message) = body.validate() {
            return Ok(UpdateStaffResponse::BadRequest(Json(message)));
        }

        let db = db.lock().await;

        match update_staff(&*db, auth.actor(), id.0, body.fields(), body.effective_date).await {
            Ok(Some(staff)) => Ok(UpdateStaffResponse::Ok(Json(staff))),
            Ok(None) => Ok(UpdateStaffResponse::NotFound),
            Err(error) => match Rejection::from_error(error)? {
                Rejection::Conflict(m) => Ok(UpdateStaffResponse::Conflict(Json(m))),
                Rejection::BadRequest(m) => Ok(UpdateStaffResponse::BadRequest(Json(m))),
            },
        }
    }

    /// Assets assigned to the staff member become unassigned.
    #[oai(path = "/staff/:id", method = "delete", operation_id = "delete_staff")]
    async fn api_delete_staff(
        &self,
        db: Data<&Arc<Mutex<DatabaseConnection>>>,
        id: Path<Uuid>,
        _sec_scheme: TokenSecurityScheme,
    ) -> Result<DeleteStaffResponse, AssetdeskError> {
        let db = db.lock().await;

        let Some(staff) = Staff::Entity::find_by_id(id.0).one(&*db).await? else {
            return Ok(DeleteStaffResponse::NotFound);
        };

        staff.delete(&*db).await?;
        Ok(DeleteStaffResponse::Deleted)
    }

    #[oai(
        path = "/staff/:id/history",
        method = "get",
        operation_id = "get_staff_history"
    )]
    async fn api_get_staff_history(
        &self,
        db: Data<&Arc<Mutex<DatabaseConnection>>>,
        id: Path<Uuid>,
        offset: Query<Option<u64>>,
        limit: Query<Option<u64>>,
        _sec_scheme: TokenSecurityScheme,
    ) -> Result<GetStaffHistoryResponse, AssetdeskError> {
        let db = db.lock().await;

        if Staff::Entity::find_by_id(id.0).one(&*db).await?.is_none() {
            return Ok(GetStaffHistoryResponse::NotFound);
        }

        let q = StaffHistory::Entity::find()
            .filter(StaffHistory::Column::StaffId.eq(id.0))
            .order_by_desc(StaffHistory::Column::CreatedAt);

        let response = PaginatedResponse::new(
            q,
            PaginationParams {
                offset: *offset,
                limit: *limit,
            },
            &*db,
            |entry| entry,
        )
        .await?;

        Ok(GetStaffHistoryResponse::Ok(Json(response)))
    }
}
