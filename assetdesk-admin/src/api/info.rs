use std::sync::Arc;

use assetdesk_common::api::{RequestAuthorization, TokenSecurityScheme};
use assetdesk_common::version::assetdesk_version;
use assetdesk_common::{AssetdeskConfig, AssetdeskError};
use poem::web::Data;
use poem_openapi::payload::Json;
use poem_openapi::{ApiResponse, Object, OpenApi};
use serde::Serialize;
use tokio::sync::Mutex;

pub struct Api;

#[derive(Serialize, Object)]
pub struct Info {
    version: String,
    asset_code_prefix: String,
    asset_code_width: u64,
    actor: String,
}

#[derive(ApiResponse)]
enum InstanceInfoResponse {
    #[oai(status = 200)]
    Ok(Json<Info>),
}

#[OpenApi]
impl Api {
    #[oai(path = "/info", method = "get", operation_id = "get_info")]
    async fn api_get_info(
        &self,
        config: Data<&Arc<Mutex<AssetdeskConfig>>>,
        auth: Data<&RequestAuthorization>,
        _sec_scheme: TokenSecurityScheme,
    ) -> Result<InstanceInfoResponse, AssetdeskError> {
        let config = config.lock().await;
        Ok(InstanceInfoResponse::Ok(Json(Info {
            version: assetdesk_version().to_string(),
            asset_code_prefix: config.store.asset_codes.prefix.clone(),
            asset_code_width: config.store.asset_codes.width as u64,
            actor: auth.actor().to_owned(),
        })))
    }
}
