use assetdesk_db_entities::{Category, Location, Staff};
use assetdesk_db_migrations::migrate_database;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use uuid::Uuid;

pub async fn memory_db() -> DatabaseConnection {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opt).await.unwrap();
    migrate_database(&db).await.unwrap();
    db
}

pub async fn insert_category(db: &DatabaseConnection, name: &str, code: &str) -> Category::Model {
    Category::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_owned()),
        code: Set(code.to_owned()),
        description: Set(None),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn insert_location(db: &DatabaseConnection, name: &str) -> Location::Model {
    Location::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_owned()),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn insert_staff(db: &DatabaseConnection, staff_id: &str, name: &str) -> Staff::Model {
    let now = Utc::now();
    Staff::ActiveModel {
        id: Set(Uuid::new_v4()),
        staff_id: Set(staff_id.to_owned()),
        name: Set(name.to_owned()),
        position: Set(None),
        email: Set(None),
        phone: Set(None),
        location_id: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .unwrap()
}
