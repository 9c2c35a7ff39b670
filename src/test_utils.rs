use std::sync::Arc;

use migration::MigratorTrait;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Database as SeaDatabase, Set};

use crate::database::Database;
use crate::entities;

pub async fn test_db() -> Arc<Database> {
    let conn = SeaDatabase::connect("sqlite::memory:?mode=rwc")
        .await
        .unwrap();

    // Enable foreign keys
    conn.execute_unprepared("PRAGMA foreign_keys = ON")
        .await
        .unwrap();

    migration::Migrator::up(&conn, None)
        .await
        .unwrap_or_else(|e| panic!("Failed to migrate test database: {}", e));

    Arc::new(Database { conn })
}

/// Insert an album priced in cents
pub async fn insert_album(db: &Database, title: &str, price: i64) -> entities::album::Model {
    entities::album::ActiveModel {
        title: Set(title.to_string()),
        price: Set(price),
        album_art_url: Set(None),
        created_at: Set(chrono::Utc::now().timestamp()),
        ..Default::default()
    }
    .insert(&db.conn)
    .await
    .unwrap()
}
