use async_graphql::{Context, Object, SimpleObject};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::http_server::graphql::catalog_queries::Album;
use crate::http_server::graphql::context::{get_app_state, get_request_context};
use crate::http_server::graphql_error::GraphqlResult;
use crate::services::shopping_cart::{CartLine, ShoppingCartService};

#[derive(Debug, Clone, SimpleObject)]
pub struct CartItem {
    pub record_id: i64,
    pub album: Album,
    pub count: i32,
    pub date_created: DateTime<Utc>,
    pub line_total: Decimal,
}

impl From<CartLine> for CartItem {
    fn from(line: CartLine) -> Self {
        Self {
            line_total: line.line_total(),
            record_id: line.item.record_id,
            count: line.item.count,
            date_created: line.item.date_created,
            album: line.album.into(),
        }
    }
}

#[derive(Debug, Clone, SimpleObject)]
pub struct Cart {
    pub cart_id: String,
    pub items: Vec<CartItem>,
    pub count: i64,
    pub total: Decimal,
}

/// Snapshot of the cart behind `service`.
pub(crate) async fn load_cart(service: &ShoppingCartService) -> color_eyre::Result<Cart> {
    let lines = service.get_cart_items().await?;
    let count = service.get_count().await?;
    let total = service.get_total().await?;

    Ok(Cart {
        cart_id: service.cart_id().to_string(),
        items: lines.into_iter().map(Into::into).collect(),
        count,
        total,
    })
}

#[derive(Default)]
pub struct CartQuery;

#[Object]
impl CartQuery {
    async fn cart(&self, ctx: &Context<'_>) -> GraphqlResult<Cart> {
        let app_state = get_app_state(ctx)?;
        let request = get_request_context(ctx)?;
        let service = ShoppingCartService::for_request(app_state.db.clone(), request);
        Ok(load_cart(&service).await?)
    }
}
