use chrono::Utc;
use color_eyre::{Result, eyre::Context};
use sea_orm::{EntityTrait, PaginatorTrait, Set};

use crate::database::Database;
use crate::entities;

const PLACEHOLDER_ART: &str = "/images/placeholder.gif";

/// (title, price in cents)
const SAMPLE_ALBUMS: &[(&str, i64)] = &[
    ("A Copland Celebration, Vol. I", 899),
    ("Abbey Road", 899),
    ("Back in Black", 899),
    ("Blue Train", 899),
    ("Greatest Hits", 899),
    ("In Through The Out Door", 899),
    ("Kind of Blue", 899),
    ("Led Zeppelin IV", 899),
    ("Let There Be Rock", 899),
    ("Rumours", 899),
    ("The Doors", 899),
    ("The Joshua Tree", 999),
    ("Thriller", 999),
    ("Vs.", 899),
];

/// Fill an empty catalog with sample albums. Returns the number inserted.
pub async fn seed(db: &Database) -> Result<usize> {
    let existing = entities::album::Entity::find()
        .count(&db.conn)
        .await
        .context("Failed to count albums")?;

    if existing > 0 {
        log::info!("Catalog already has {} albums, skipping seed", existing);
        return Ok(0);
    }

    let now = Utc::now().timestamp();
    let albums = SAMPLE_ALBUMS
        .iter()
        .map(|(title, price)| entities::album::ActiveModel {
            title: Set(title.to_string()),
            price: Set(*price),
            album_art_url: Set(Some(PLACEHOLDER_ART.to_string())),
            created_at: Set(now),
            ..Default::default()
        });

    entities::album::Entity::insert_many(albums)
        .exec(&db.conn)
        .await
        .context("Failed to insert sample albums")?;

    log::info!("Seeded {} sample albums", SAMPLE_ALBUMS.len());
    Ok(SAMPLE_ALBUMS.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_db;

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let db = test_db().await;

        assert_eq!(seed(&db).await.unwrap(), SAMPLE_ALBUMS.len());
        assert_eq!(seed(&db).await.unwrap(), 0);

        let count = entities::album::Entity::find().count(&db.conn).await.unwrap();
        assert_eq!(count, SAMPLE_ALBUMS.len() as u64);
    }
}
