use std::sync::Arc;

use assetdesk_common::api::TokenSecurityScheme;
use assetdesk_common::{AssetdeskConfig, AssetdeskError};
use assetdesk_core::consts::MAX_TIMELINE_MONTHS;
use assetdesk_core::reports::{
    load_dashboard_summary, load_status_timeline, DashboardSummary, StatusBucket,
};
use chrono::Utc;
use poem::web::Data;
use poem_openapi::param::Query;
use poem_openapi::payload::Json;
use poem_openapi::{ApiResponse, OpenApi};
use sea_orm::DatabaseConnection;
use tokio::sync::Mutex;

pub struct Api;

#[derive(ApiResponse)]
enum GetSummaryResponse {
    #[oai(status = 200)]
    Ok(Json<DashboardSummary>),
}

#[derive(ApiResponse)]
enum GetStatusTimelineResponse {
    #[oai(status = 200)]
    Ok(Json<Vec<StatusBucket>>),
    #[oai(status = 400)]
    BadRequest(Json<String>),
}

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

#[OpenApi]
impl Api {
    #[oai(path = "/reports/summary", method = "get", operation_id = "get_summary")]
    async fn api_get_summary(
        &self,
        db: Data<&Arc<Mutex<DatabaseConnection>>>,
        config: Data<&Arc<Mutex<AssetdeskConfig>>>,
        _sec_scheme: TokenSecurityScheme,
    ) -> Result<GetSummaryResponse, AssetdeskError> {
        let window_days =
            config.lock().await.store.reports.license_expiry_warning.as_secs() / SECONDS_PER_DAY;
        let db = db.lock().await;

        let summary = load_dashboard_summary(&*db, Utc::now().date_naive(), window_days).await?;
        Ok(GetSummaryResponse::Ok(Json(summary)))
    }

    /// Month-end asset counts per status, oldest month first.
    #[oai(
        path = "/reports/status-timeline",
        method = "get",
        operation_id = "get_status_timeline"
    )]
    async fn api_get_status_timeline(
        &self,
        db: Data<&Arc<Mutex<DatabaseConnection>>>,
        config: Data<&Arc<Mutex<AssetdeskConfig>>>,
        months: Query<Option<u32>>,
        _sec_scheme: TokenSecurityScheme,
    ) -> Result<GetStatusTimelineResponse, AssetdeskError> {
        let months = match *months {
            Some(months) => months,
            None => config.lock().await.store.reports.months,
        };
        if !(1..=MAX_TIMELINE_MONTHS).contains(&months) {
            return Ok(GetStatusTimelineResponse::BadRequest(Json(format!(
                "months must be between 1 and {MAX_TIMELINE_MONTHS}"
            ))));
        }

        let db = db.lock().await;

        let timeline = load_status_timeline(&*db, Utc::now(), months).await?;
        Ok(GetStatusTimelineResponse::Ok(Json(timeline)))
    }
}
