use async_graphql::{Context, InputObject, Object, SimpleObject};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::http_server::graphql::cart_queries::{Cart, load_cart};
use crate::http_server::graphql::context::{
    get_app_state, get_request_context, require_user_name,
};
use crate::http_server::graphql_error::GraphqlResult;
use crate::services::shopping_cart::{NewOrder, ShoppingCartService};

#[derive(Debug, Clone, SimpleObject, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveFromCartResult {
    pub message: String,
    pub cart_total: Decimal,
    pub cart_count: i64,
    /// Remaining quantity of the line item, 0 once removed
    pub item_count: i32,
    pub delete_id: i64,
}

#[derive(Debug, Clone, InputObject)]
pub struct CheckoutInput {
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub phone: String,
    pub email: String,
}

#[derive(Debug, Clone, SimpleObject)]
pub struct CheckoutResult {
    /// Confirmation number
    pub order_id: i64,
}

/// Remove one copy of a line item and summarize the cart afterwards.
pub(crate) async fn remove_line(
    service: &ShoppingCartService,
    record_id: i64,
) -> color_eyre::Result<RemoveFromCartResult> {
    // Album title for the confirmation message
    let album_title = service
        .get_cart_items()
        .await?
        .into_iter()
        .find(|line| line.item.record_id == record_id)
        .map(|line| line.album.title);

    let item_count = service.remove_from_cart(record_id).await?;
    let album_title = album_title.unwrap_or_else(|| "Item".to_string());

    Ok(RemoveFromCartResult {
        message: format!("{} has been removed from your shopping cart.", album_title),
        cart_total: service.get_total().await?,
        cart_count: service.get_count().await?,
        item_count,
        delete_id: record_id,
    })
}

#[derive(Default)]
pub struct CartMutation;

#[Object]
impl CartMutation {
    async fn add_to_cart(&self, ctx: &Context<'_>, album_id: i64) -> GraphqlResult<Cart> {
        let app_state = get_app_state(ctx)?;
        let request = get_request_context(ctx)?;
        let service = ShoppingCartService::for_request(app_state.db.clone(), request);

        service.add_to_cart(album_id).await?;

        Ok(load_cart(&service).await?)
    }

    async fn remove_from_cart(
        &self,
        ctx: &Context<'_>,
        record_id: i64,
    ) -> GraphqlResult<RemoveFromCartResult> {
        let app_state = get_app_state(ctx)?;
        let request = get_request_context(ctx)?;
        let service = ShoppingCartService::for_request(app_state.db.clone(), request);

        Ok(remove_line(&service, record_id).await?)
    }

    async fn empty_cart(&self, ctx: &Context<'_>) -> GraphqlResult<i64> {
        let app_state = get_app_state(ctx)?;
        let request = get_request_context(ctx)?;
        let service = ShoppingCartService::for_request(app_state.db.clone(), request);

        Ok(service.empty_cart().await? as i64)
    }

    /// Place an order for the signed-in user from the current cart
    async fn checkout(
        &self,
        ctx: &Context<'_>,
        input: CheckoutInput,
    ) -> GraphqlResult<CheckoutResult> {
        let app_state = get_app_state(ctx)?;
        let request = get_request_context(ctx)?;
        let username = require_user_name(ctx)?;
        let service = ShoppingCartService::for_request(app_state.db.clone(), request);

        let order_id = service
            .create_order(NewOrder {
                username: username.to_string(),
                first_name: input.first_name,
                last_name: input.last_name,
                address: input.address,
                city: input.city,
                state: input.state,
                postal_code: input.postal_code,
                country: input.country,
                phone: input.phone,
                email: input.email,
            })
            .await?;

        Ok(CheckoutResult { order_id })
    }

    /// Move the current cart to the signed-in user, merging with any cart they already have
    async fn migrate_cart(&self, ctx: &Context<'_>) -> GraphqlResult<Cart> {
        let app_state = get_app_state(ctx)?;
        let request = get_request_context(ctx)?;
        let username = require_user_name(ctx)?;
        let mut service = ShoppingCartService::for_request(app_state.db.clone(), request);

        service.migrate_cart(request, username).await?;

        Ok(load_cart(&service).await?)
    }
}
