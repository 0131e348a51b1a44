use std::sync::Arc;

use assetdesk_common::api::{RequestAuthorization, TokenSecurityScheme};
use assetdesk_common::{AssetCodeConfig, AssetdeskConfig, AssetdeskError};
use assetdesk_core::assets::{
    create_asset, next_name_for_category, update_asset, AssetUpdate, NewAsset,
};
use assetdesk_db_entities::Asset::{self, AssetStatus};
use assetdesk_db_entities::AssetHistory;
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
use super::{like_pattern, Rejection};

async fn asset_codes(config: &Mutex<AssetdeskConfig>) -> AssetCodeConfig {
    config.lock().await.store.asset_codes.clone()
}

#[derive(Object)]
struct CreateAssetRequest {
    /// Generated from the category code when omitted
    name: Option<String>,
    serial_number: Option<String>,
    category_id: Option<Uuid>,
    status: Option<AssetStatus>,
    assigned_to: Option<Uuid>,
    purchase_date: Option<NaiveDate>,
    description: Option<String>,
}

#[derive(Object)]
struct UpdateAssetRequest {
    serial_number: Option<String>,
    category_id: Option<Uuid>,
    status: AssetStatus,
    assigned_to: Option<Uuid>,
    purchase_date: Option<NaiveDate>,
    description: Option<String>,
    /// When a status change actually took effect, if not today
    effective_date: Option<NaiveDate>,
}

#[derive(Object)]
struct NextAssetName {
    name: String,
}

#[derive(ApiResponse)]
enum GetAssetsResponse {
    #[oai(status = 200)]
    Ok(Json<PaginatedResponse<Asset::Model>>),
}

#[derive(ApiResponse)]
enum CreateAssetResponse {
    #[oai(status = 201)]
    Created(Json<Asset::Model>),
    #[oai(status = 400)]
    BadRequest(Json<String>),
    #[oai(status = 409)]
    Conflict(Json<String>),
}

#[derive(ApiResponse)]
enum GetNextAssetNameResponse {
    #[oai(status = 200)]
    Ok(Json<NextAssetName>),
    #[oai(status = 400)]
    BadRequest(Json<String>),
}

pub struct ListApi;

#[OpenApi]
impl ListApi {
    #[oai(path = "/assets", method = "get", operation_id = "get_assets")]
    #[allow(clippy::too_many_arguments)]
    async fn api_get_all_assets(
        &self,
        db: Data<&Arc<Mutex<DatabaseConnection>>>,
        search: Query<Option<String>>,
        status: Query<Option<AssetStatus>>,
        category_id: Query<Option<Uuid>>,
        assigned_to: Query<Option<Uuid>>,
        offset: Query<Option<u64>>,
        limit: Query<Option<u64>>,
        _sec_scheme: TokenSecurityScheme,
    ) -> Result<GetAssetsResponse, AssetdeskError> {
        let db = db.lock().await;

        let mut q = Asset::Entity::find().order_by_asc(Asset::Column::Name);

        if let Some(ref search) = *search {
            let search = like_pattern(search);
            q = q.filter(
                Condition::any()
                    .add(Asset::Column::Name.like(&search))
                    .add(Asset::Column::SerialNumber.like(&search))
                    .add(Asset::Column::Description.like(&search)),
            );
        }
        if let Some(status) = *status {
            q = q.filter(Asset::Column::Status.eq(status));
        }
        if let Some(category_id) = *category_id {
            q = q.filter(Asset::Column::CategoryId.eq(category_id));
        }
        if let Some(assigned_to) = *assigned_to {
            q = q.filter(Asset::Column::AssignedTo.eq(assigned_to));
        }

        let response = PaginatedResponse::new(
            q,
            PaginationParams {
                offset: *offset,
                limit: *limit,
            },
            &*db,
            |asset| asset,
        )
        .await?;

        Ok(GetAssetsResponse::Ok(Json(response)))
    }

    #[oai(path = "/assets", method = "post", operation_id = "create_asset")]
    async fn api_create_asset(
        &self,
        db: Data<&Arc<Mutex<DatabaseConnection>>>,
        config: Data<&Arc<Mutex<AssetdeskConfig>>>,
        auth: Data<&RequestAuthorization>,
        body: Json<CreateAssetRequest>,
        _sec_scheme: TokenSecurityScheme,
    ) -> Result<CreateAssetResponse, AssetdeskError> {
        let codes = asset_codes(&config).await;
        let body = body.0;
        let new = NewAsset {
            name: body.name,
            serial_number: body.serial_number,
            category_id: body.category_id,
            status: body.status,
            assigned_to: body.assigned_to,
            purchase_date: body.purchase_date,
            description: body.description,
        };

        let db = db.lock().await;

        match create_asset(&*db, &codes, auth.actor(), new).await {
            Ok(asset) => Ok(CreateAssetResponse::Created(Json(asset))),
            Err(error) => match Rejection::from_error(error)? {
                Rejection::Conflict(m) => Ok(CreateAssetResponse::Conflict(Json(m))),
                Rejection::BadRequest(m) => Ok(CreateAssetResponse::BadRequest(Json(m))),
            },
        }
    }

    /// Previews the name a new asset in the category would get. The name is
    /// not reserved.
    #[oai(
        path = "/assets/next-name",
        method = "get",
        operation_id = "get_next_asset_name"
    )]
    async fn api_get_next_asset_name(
        &self,
        db: Data<&Arc<Mutex<DatabaseConnection>>>,
        config: Data<&Arc<Mutex<AssetdeskConfig>>>,
        category_id: Query<Uuid>,
        _sec_scheme: TokenSecurityScheme,
    ) -> Result<GetNextAssetNameResponse, AssetdeskError> {
        let codes = asset_codes(&config).await;
        let db = db.lock().await;

        match next_name_for_category(&*db, &codes, category_id.0).await {
            Ok(name) => Ok(GetNextAssetNameResponse::Ok(Json(NextAssetName { name }))),
            Err(error) => match Rejection::from_error(error)? {
                Rejection::Conflict(m) | Rejection::BadRequest(m) => {
                    Ok(GetNextAssetNameResponse::BadRequest(Json(m)))
                }
            },
        }
    }
}

#[derive(ApiResponse)]
enum GetAssetResponse {
    #[oai(status = 200)]
    Ok(Json<Asset::Model>),
    #[oai(status = 404)]
    NotFound,
}

#[derive(ApiResponse)]
enum UpdateAssetResponse {
    #[oai(status = 200)]
    Ok(Json<Asset::Model>),
    #[oai(status = 400)]
    BadRequest(Json<String>),
    #[oai(status = 404)]
    NotFound,
    #[oai(status = 409)]
    Conflict(Json<String>),
}

#[derive(ApiResponse)]
enum DeleteAssetResponse {
    #[oai(status = 204)]
    Deleted,
    #[oai(status = 404)]
    NotFound,
}

#[derive(ApiResponse)]
enum GetAssetHistoryResponse {
    #[oai(status = 200)]
    Ok(Json<PaginatedResponse<AssetHistory::Model>>),
    #[oai(status = 404)]
    NotFound,
}

pub struct DetailApi;

#[OpenApi]
impl DetailApi {
    #[oai(path = "/assets/:id", method = "get", operation_id = "get_asset")]
    async fn api_get_asset(
        &self,
        db: Data<&Arc<Mutex<DatabaseConnection>>>,
        id: Path<Uuid>,
        _sec_scheme: TokenSecurityScheme,
    ) -> Result<GetAssetResponse, AssetdeskError> {
        let db = db.lock().await;

        Ok(match Asset::Entity::find_by_id(id.0).one(&*db).await? {
            Some(asset) => GetAssetResponse::Ok(Json(asset)),
            None => GetAssetResponse::NotFound,
        })
    }

    /// Replaces the editable fields. The asset name cannot be changed.
    #[oai(path = "/assets/:id", method = "put", operation_id = "update_asset")]
    async fn api_update_asset(
        &self,
        db: Data<&Arc<Mutex<DatabaseConnection>>>,
        auth: Data<&RequestAuthorization>,
        body: Json<UpdateAssetRequest>,
        id: Path<Uuid>,
        _sec_scheme: TokenSecurityScheme,
    ) -> Result<UpdateAssetResponse, AssetdeskError> {
        let body = body.0;
        let update = AssetUpdate {
            serial_number: body.serial_number,
            category_id: body.category_id,
            status: body.status,
            assigned_to: body.assigned_to,
            purchase_date: body.purchase_date,
            description: body.description,
            effective_date: body.effective_date,
        };

        let db = db.lock().await;

        match update_asset(&*db, auth.actor(), id.0, update).await {
            Ok(Some(asset)) => Ok(UpdateAssetResponse::Ok(Json(asset))),
            Ok(None) => Ok(UpdateAssetResponse::NotFound),
            Err(error) => match Rejection::from_error(error)? {
                Rejection::Conflict(m) => Ok(UpdateAssetResponse::Conflict(Json(m))),
                Rejection::BadRequest(m) => Ok(UpdateAssetResponse::BadRequest(Json(m))),
            },
        }
    }

    /// Also removes the asset's history.
    #[oai(path = "/assets/:id", method = "delete", operation_id = "delete_asset")]
    async fn api_delete_asset(
        &self,
        db: Data<&Arc<Mutex<DatabaseConnection>>>,
        id: Path<Uuid>,
        _sec_scheme: TokenSecurityScheme,
    ) -> Result<DeleteAssetResponse, AssetdeskError> {
        let db = db.lock().await;

        let Some(asset) = Asset::Entity::find_by_id(id.0).one(&*db).await? else {
            return Ok(DeleteAssetResponse::NotFound);
        };

        asset.delete(&*db).await?;
        Ok(DeleteAssetResponse::Deleted)
    }

    /// Newest first
    #[oai(
        path = "/assets/:id/history",
        method = "get",
        operation_id = "get_asset_history"
    )]
    async fn api_get_asset_history(
        &self,
        db: Data<&Arc<Mutex<DatabaseConnection>>>,
        id: Path<Uuid>,
        offset: Query<Option<u64>>,
        limit: Query<Option<u64>>,
        _sec_scheme: TokenSecurityScheme,
    ) -> Result<GetAssetHistoryResponse, AssetdeskError> {
        let db = db.lock().await;

        if Asset::Entity::find_by_id(id.0).one(&*db).await?.is_none() {
            return Ok(GetAssetHistoryResponse::NotFound);
        }

        let q = AssetHistory::Entity::find()
            .filter(AssetHistory::Column::AssetId.eq(id.0))
            .order_by_desc(AssetHistory::Column::CreatedAt);

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

        Ok(GetAssetHistoryResponse::Ok(Json(response)))
    }
}
