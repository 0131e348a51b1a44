use anyhow::{Context, Result};
use assetdesk_core::asset_codes::generate_asset_name;
use assetdesk_core::db::connect_to_db;
use assetdesk_db_entities::Category;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

use crate::config::load_config;

pub(crate) async fn command(cli: &crate::Cli, category_code: &str) -> Result<()> {
    let config = load_config(&cli.config, true)?;
    let db = connect_to_db(&config).await?;

    let category = Category::Entity::find()
        .filter(Category::Column::Code.eq(category_code))
        .one(&db)
        .await?
        .with_context(|| format!("No category with code {category_code:?}"))?;

    let codes = &config.store.asset_codes;
    let name = generate_asset_name(&db, &codes.prefix, &category.code, codes.width).await?;
    println!("{name}");
    Ok(())
}
