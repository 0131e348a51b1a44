use std::sync::Arc;

use anyhow::Result;
use assetdesk_common::AssetdeskConfig;
use sea_orm::DatabaseConnection;
use tokio::sync::Mutex;

use crate::db::connect_to_db;

#[derive(Clone)]
pub struct Services {
    pub db: Arc<Mutex<DatabaseConnection>>,
    pub config: Arc<Mutex<AssetdeskConfig>>,
}

impl Services {
    pub async fn new(config: AssetdeskConfig) -> Result<Self> {
        let db = connect_to_db(&config).await?;
        Ok(Self::from_parts(db, config))
    }

    pub fn from_parts(db: DatabaseConnection, config: AssetdeskConfig) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            config: Arc::new(Mutex::new(config)),
        }
    }
}
