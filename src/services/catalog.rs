use std::collections::HashMap;
use std::sync::Arc;

use color_eyre::{Result, eyre::Context};
use sea_orm::{
    ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};

use crate::database::Database;
use crate::entities;

pub struct AlbumWithSales {
    pub album: entities::album::Model,
    /// Number of order lines that include this album
    pub sales_count: u64,
}

pub struct CatalogService {
    db: Arc<Database>,
}

impl CatalogService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Albums with the most order lines first, ties broken by album id.
    pub async fn top_selling_albums(&self, count: usize) -> Result<Vec<AlbumWithSales>> {
        log::debug!("Loading top {} selling albums", count);

        let sales = entities::order_detail::Column::Id.count();
        let ranked: Vec<(i64, i64)> = entities::album::Entity::find()
            .select_only()
            .column(entities::album::Column::Id)
            .column_as(sales.clone(), "sales_count")
            .left_join(entities::order_detail::Entity)
            .group_by(entities::album::Column::Id)
            .order_by_desc(sales)
            .order_by_asc(entities::album::Column::Id)
            .limit(count as u64)
            .into_tuple()
            .all(&self.db.conn)
            .await
            .context("Failed to rank albums by sales")?;

        let mut albums: HashMap<i64, entities::album::Model> = entities::album::Entity::find()
            .filter(entities::album::Column::Id.is_in(ranked.iter().map(|(id, _)| *id)))
            .all(&self.db.conn)
            .await
            .context("Failed to fetch albums")?
            .into_iter()
            .map(|album| (album.id, album))
            .collect();

        Ok(ranked
            .into_iter()
            .filter_map(|(id, sales_count)| {
                albums.remove(&id).map(|album| AlbumWithSales {
                    album,
                    sales_count: sales_count as u64,
                })
            })
            .collect())
    }

    pub async fn list_albums(&self) -> Result<Vec<entities::album::Model>> {
        entities::album::Entity::find()
            .order_by_asc(entities::album::Column::Title)
            .all(&self.db.conn)
            .await
            .context("Failed to fetch albums")
    }

    pub async fn get_album(&self, album_id: i64) -> Result<Option<entities::album::Model>> {
        entities::album::Entity::find_by_id(album_id)
            .one(&self.db.conn)
            .await
            .context(format!("Failed to fetch album {}", album_id))
    }

    pub async fn album_count(&self) -> Result<u64> {
        entities::album::Entity::find()
            .count(&self.db.conn)
            .await
            .context("Failed to count albums")
    }
}
