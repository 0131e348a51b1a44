use sea_orm::DatabaseConnection;
use sea_orm_migration::prelude::*;
use sea_orm_migration::MigrationTrait;

mod m00001_locations_and_categories;
mod m00002_staff;
mod m00003_assets;
mod m00004_licenses;
mod m00005_history;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m00001_locations_and_categories::Migration),
            Box::new(m00002_staff::Migration),
            Box::new(m00003_assets::Migration),
            Box::new(m00004_licenses::Migration),
            Box::new(m00005_history::Migration),
        ]
    }
}

pub async fn migrate_database(connection: &DatabaseConnection) -> Result<(), DbErr> {
    let pending = Migrator::get_pending_migrations(connection).await?.len();
    if pending > 0 {
        tracing::info!(pending, "Applying database migrations");
    }
    Migrator::up(connection, None).await
}
