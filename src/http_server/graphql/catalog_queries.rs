use async_graphql::{Context, Object, SimpleObject};
use rust_decimal::Decimal;

use crate::entities;
use crate::http_server::graphql::context::get_app_state;
use crate::http_server::graphql_error::GraphqlResult;
use crate::services::catalog::CatalogService;

#[derive(Debug, Clone, SimpleObject)]
pub struct Album {
    pub id: i64,
    pub title: String,
    pub price: Decimal,
    pub album_art_url: Option<String>,
}

impl From<entities::album::Model> for Album {
    fn from(model: entities::album::Model) -> Self {
        Self {
            price: model.unit_price(),
            id: model.id,
            title: model.title,
            album_art_url: model.album_art_url,
        }
    }
}

#[derive(Debug, Clone, SimpleObject)]
pub struct TopSellingAlbum {
    pub album: Album,
    pub sales_count: i64,
}

#[derive(Default)]
pub struct CatalogQuery;

#[Object]
impl CatalogQuery {
    /// Best sellers by number of order lines; defaults to the home page count
    async fn top_selling_albums(
        &self,
        ctx: &Context<'_>,
        count: Option<i32>,
    ) -> GraphqlResult<Vec<TopSellingAlbum>> {
        let app_state = get_app_state(ctx)?;
        let count = count
            .map(|c| c.clamp(0, 100) as usize)
            .unwrap_or(app_state.config.http.top_selling_count);
        let service = CatalogService::new(app_state.db.clone());

        let albums = service.top_selling_albums(count).await?;

        Ok(albums
            .into_iter()
            .map(|a| TopSellingAlbum {
                sales_count: a.sales_count as i64,
                album: a.album.into(),
            })
            .collect())
    }

    async fn albums(&self, ctx: &Context<'_>) -> GraphqlResult<Vec<Album>> {
        let app_state = get_app_state(ctx)?;
        let service = CatalogService::new(app_state.db.clone());
        let albums = service.list_albums().await?;
        Ok(albums.into_iter().map(Into::into).collect())
    }

    async fn album(&self, ctx: &Context<'_>, id: i64) -> GraphqlResult<Option<Album>> {
        let app_state = get_app_state(ctx)?;
        let service = CatalogService::new(app_state.db.clone());
        Ok(service.get_album(id).await?.map(Into::into))
    }

    async fn album_count(&self, ctx: &Context<'_>) -> GraphqlResult<i64> {
        let app_state = get_app_state(ctx)?;
        let service = CatalogService::new(app_state.db.clone());
        Ok(service.album_count().await? as i64)
    }
}
