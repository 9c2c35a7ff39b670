use async_graphql::{Context, Object, SimpleObject};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::http_server::graphql::catalog_queries::Album;
use crate::http_server::graphql::context::{get_app_state, require_user_name};
use crate::http_server::graphql_error::GraphqlResult;
use crate::services::order::{OrderService, OrderWithDetails};

#[derive(Debug, Clone, SimpleObject)]
pub struct OrderDetail {
    pub id: i64,
    pub album: Album,
    pub quantity: i32,
    pub unit_price: Decimal,
}

#[derive(Debug, Clone, SimpleObject)]
pub struct Order {
    pub id: i64,
    pub order_date: DateTime<Utc>,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub phone: String,
    pub email: String,
    pub total: Decimal,
    pub details: Vec<OrderDetail>,
}

impl From<OrderWithDetails> for Order {
    fn from(owd: OrderWithDetails) -> Self {
        let order = owd.order;
        Self {
            total: order.total_amount(),
            id: order.id,
            order_date: order.order_date,
            username: order.username,
            first_name: order.first_name,
            last_name: order.last_name,
            address: order.address,
            city: order.city,
            state: order.state,
            postal_code: order.postal_code,
            country: order.country,
            phone: order.phone,
            email: order.email,
            details: owd
                .details
                .into_iter()
                .map(|d| OrderDetail {
                    unit_price: d.detail.unit_price_amount(),
                    id: d.detail.id,
                    quantity: d.detail.quantity,
                    album: d.album.into(),
                })
                .collect(),
        }
    }
}

#[derive(Default)]
pub struct OrderQuery;

#[Object]
impl OrderQuery {
    /// An order placed by the signed-in user
    async fn order(&self, ctx: &Context<'_>, id: i64) -> GraphqlResult<Option<Order>> {
        let app_state = get_app_state(ctx)?;
        let username = require_user_name(ctx)?;
        let service = OrderService::new(app_state.db.clone());

        Ok(service.find_order(id, username).await?.map(Into::into))
    }
}
