use std::sync::Arc;

use assetdesk_common::api::TokenSecurityScheme;
use assetdesk_common::AssetdeskError;
use assetdesk_core::categories::{
    create_category, update_category, validate_category_code, CategoryFields,
};
use assetdesk_db_entities::Category;
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
struct CategoryDataRequest {
    name: String,
    /// Used as the middle segment of generated asset names
    code: String,
    description: Option<String>,
}

impl CategoryDataRequest {
    fn validate(&self) -> Option<String> {
        require("name", &self.name)
            .or_else(|| require("code", &self.code))
            .or_else(|| validate_category_code(&self.code))
    }

    fn fields(&self) -> CategoryFields {
        CategoryFields {
            name: self.name.clone(),
            code: self.code.clone(),
            description: self.description.clone(),
        }
    }
}

#[derive(ApiResponse)]
enum GetCategoriesResponse {
    #[oai(status = 200)]
    Ok(Json<Vec<Category::Model>>),
}

#[derive(ApiResponse)]
enum CreateCategoryResponse {
    #[oai(status = 201)]
    Created(Json<Category::Model>),
    #[oai(status = 400)]
    BadRequest(Json<String>),
    #[oai(status = 409)]
    Conflict(Json<String>),
}

pub struct ListApi;

#[OpenApi]
impl ListApi {
    #[oai(path = "/categories", method = "get", operation_id = "get_categories")]
    async fn api_get_all_categories(
        &self,
        db: Data<&Arc<Mutex<DatabaseConnection>>>,
        search: Query<Option<String>>,
        _sec_scheme: TokenSecurityScheme,
    ) -> Result<GetCategoriesResponse, AssetdeskError> {
        let db = db.lock().await;

        let mut categories = Category::Entity::find().order_by_asc(Category::Column::Name);

        if let Some(ref search) = *search {
            let search = like_pattern(search);
            categories = categories.filter(
                Condition::any()
                    .add(Category::Column::Name.like(&search))
                    .add(Category::Column::Code.like(&search)),
            );
        }

        let categories = categories.all(&*db).await?;
        Ok(GetCategoriesResponse::Ok(Json(categories)))
    }

    #[oai(path = "/categories", method = "post", operation_id = "create_category")]
    async fn api_create_category(
        &self,
        db: Data<&Arc<Mutex<DatabaseConnection>>>,
        body: Json<CategoryDataRequest>,
        _sec_scheme: TokenSecurityScheme,
    ) -> Result<CreateCategoryResponse, AssetdeskError> {
        if let Some(message) = body.validate() {
            return Ok(CreateCategoryResponse::BadRequest(Json(message)));
        }

        let db = db.lock().await;

        match create_category(&*db, body.fields()).await {
            Ok(category) => Ok(CreateCategoryResponse::Created(Json(category))),
            Err(error) => match Rejection::from_error(error)? {
                Rejection::Conflict(m) => Ok(CreateCategoryResponse::Conflict(Json(m))),
                Rejection::BadRequest(m) => Ok(CreateCategoryResponse::BadRequest(Json(m))),
            },
        }
    }
}

#[derive(ApiResponse)]
enum GetCategoryResponse {
    #[oai(status = 200)]
    Ok(Json<Category::Model>),
    #[oai(status = 404)]
    NotFound,
}

#[derive(ApiResponse)]
enum UpdateCategoryResponse {
    #[oai(status = 200)]
    Ok(Json<Category::Model>),
    #[oai(status = 400)]
    BadRequest(Json<String>),
    #[oai(status = 404)]
    NotFound,
    #[oai(status = 409)]
    Conflict(Json<String>),
}

#[derive(ApiResponse)]
enum DeleteCategoryResponse {
    #[oai(status = 204)]
    Deleted,
    #[oai(status = 404)]
    NotFound,
}

pub struct DetailApi;

#[OpenApi]
impl DetailApi {
    #[oai(path = "/categories/:id", method = "get", operation_id = "get_category")]
    async fn api_get_category(
        &self,
        db: Data<&Arc<Mutex<DatabaseConnection>>>,
        id: Path<Uuid>,
        _sec_scheme: TokenSecurityScheme,
    ) -> Result<GetCategoryResponse, AssetdeskError> {
        let db = db.lock().await;

        Ok(match Category::Entity::find_by_id(id.0).one(&*db).await? {
            Some(category) => GetCategoryResponse::Ok(Json(category)),
            None => GetCategoryResponse::NotFound,
        })
    }

    /// Changing the code does not rename existing assets.
    #[oai(path = "/categories/:id", method = "put", operation_id = "update_category")]
    async fn api_update_category(
        &self,
        db: Data<&Arc<Mutex<DatabaseConnection>>>,
        body: Json<CategoryDataRequest>,
        id: Path<Uuid>,
        _sec_scheme: TokenSecurityScheme,
    ) -> Result<UpdateCategoryResponse, AssetdeskError> {
        if let Some(message) = body.validate() {
            return Ok(UpdateCategoryResponse::BadRequest(Json(message)));
        }

        let db = db.lock().await;

        match update_category(&*db, id.0, body.fields()).await {
            Ok(Some(category)) => Ok(UpdateCategoryResponse::Ok(Json(category))),
            Ok(None) => Ok(UpdateCategoryResponse::NotFound),
            Err(error) => match Rejection::from_error(error)? {
                Rejection::Conflict(m) => Ok(UpdateCategoryResponse::Conflict(Json(m))),
                Rejection::BadRequest(m) => Ok(UpdateCategoryResponse::BadRequest(Json(m))),
            },
        }
    }

    /// Assets in the category become uncategorized.
    #[oai(path = "/categories/:id", method = "delete", operation_id = "delete_category")]
    async fn api_delete_category(
        &self,
        db: Data<&Arc<Mutex<DatabaseConnection>>>,
        id: Path<Uuid>,
        _sec_scheme: TokenSecurityScheme,
    ) -> Result<DeleteCategoryResponse, AssetdeskError> {
        let db = db.lock().await;

        let Some(category) = Category::Entity::find_by_id(id.0).one(&*db).await? else {
            return Ok(DeleteCategoryResponse::NotFound);
        };

        category.delete(&*db).await?;
        Ok(DeleteCategoryResponse::Deleted)
    }
}
