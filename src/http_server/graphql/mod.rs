use std::sync::Arc;

use async_graphql::http::GraphiQLSource;
use async_graphql::{EmptySubscription, MergedObject, Schema};
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse};
use axum::Extension;

use crate::http_server::session_cookies::{self, SessionJar};
use crate::http_server::state::AppState;

pub mod cart_mutations;
pub mod cart_queries;
pub mod catalog_queries;
mod context;
pub mod order_queries;

use cart_mutations::CartMutation;
use cart_queries::CartQuery;
use catalog_queries::CatalogQuery;
use order_queries::OrderQuery;

#[derive(Default, MergedObject)]
pub struct Query(CatalogQuery, CartQuery, OrderQuery);

#[derive(Default, MergedObject)]
pub struct Mutation(CartMutation);

pub type StoreSchema = Schema<Query, Mutation, EmptySubscription>;

pub async fn graphiql() -> impl IntoResponse {
    Html(GraphiQLSource::build().endpoint("/graphql").finish())
}

/// Runs a GraphQL request with the caller's session and writes the session back as cookies.
pub async fn graphql_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(schema): Extension<StoreSchema>,
    jar: SessionJar,
    headers: HeaderMap,
    req: GraphQLRequest,
) -> (SessionJar, GraphQLResponse) {
    let request = session_cookies::request_context(&app_state, &jar, &headers);
    let session = request.session.clone();

    let response = schema.execute(req.into_inner().data(request)).await;

    (session_cookies::write_session(jar, &session), response.into())
}

pub fn create_schema(app_state: Arc<AppState>) -> StoreSchema {
    Schema::build(Query::default(), Mutation::default(), EmptySubscription)
        .data(app_state)
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::services::shopping_cart::CART_SESSION_KEY;
    use crate::session::{RequestContext, Session};
    use crate::test_utils::{insert_album, test_db};
    use async_graphql::Request;
    use serde_json::{Value, json};

    async fn setup() -> (StoreSchema, Arc<AppState>) {
        let app_state = Arc::new(AppState::new(test_db().await, Config::default()).unwrap());
        (create_schema(app_state.clone()), app_state)
    }

    async fn run(schema: &StoreSchema, ctx: &RequestContext, query: &str) -> Value {
        let response = schema.execute(Request::new(query).data(ctx.clone())).await;
        assert!(response.errors.is_empty(), "errors: {:?}", response.errors);
        response.data.into_json().unwrap()
    }

    #[tokio::test]
    async fn test_add_and_query_cart() {
        let (schema, app_state) = setup().await;
        let a = insert_album(&app_state.db, "Album A", 1000).await;
        let b = insert_album(&app_state.db, "Album B", 500).await;
        let ctx = RequestContext::anonymous();

        run(&schema, &ctx, &format!("mutation {{ addToCart(albumId: {}) {{ count }} }}", a.id)).await;
        run(&schema, &ctx, &format!("mutation {{ addToCart(albumId: {}) {{ count }} }}", a.id)).await;
        let data = run(
            &schema,
            &ctx,
            &format!("mutation {{ addToCart(albumId: {}) {{ count total items {{ count }} }} }}", b.id),
        )
        .await;

        assert_eq!(data["addToCart"]["count"], json!(3));
        assert_eq!(data["addToCart"]["items"].as_array().unwrap().len(), 2);
        let total: rust_decimal::Decimal = data["addToCart"]["total"]
            .as_str()
            .unwrap()
            .parse()
            .unwrap();
        assert_eq!(total, rust_decimal::Decimal::new(25, 0));

        // The generated identity was stored in the session
        let cart_id = ctx.session.get(CART_SESSION_KEY).unwrap();
        let data = run(&schema, &ctx, "{ cart { cartId count } }").await;
        assert_eq!(data["cart"]["cartId"], json!(cart_id));
        assert_eq!(data["cart"]["count"], json!(3));
    }

    #[tokio::test]
    async fn test_remove_from_cart_reports_view_model() {
        let (schema, app_state) = setup().await;
        let album = insert_album(&app_state.db, "Kind of Blue", 899).await;
        let ctx = RequestContext::anonymous();

        let data = run(
            &schema,
            &ctx,
            &format!("mutation {{ addToCart(albumId: {}) {{ items {{ recordId }} }} }}", album.id),
        )
        .await;
        let record_id = data["addToCart"]["items"][0]["recordId"].as_i64().unwrap();

        let data = run(
            &schema,
            &ctx,
            &format!(
                "mutation {{ removeFromCart(recordId: {}) {{ message cartCount itemCount deleteId }} }}",
                record_id
            ),
        )
        .await;

        let result = &data["removeFromCart"];
        assert_eq!(
            result["message"],
            json!("Kind of Blue has been removed from your shopping cart.")
        );
        assert_eq!(result["cartCount"], json!(0));
        assert_eq!(result["itemCount"], json!(0));
        assert_eq!(result["deleteId"], json!(record_id));
    }

    #[tokio::test]
    async fn test_remove_unknown_item_is_not_found() {
        let (schema, _app_state) = setup().await;
        let ctx = RequestContext::anonymous();

        let response = schema
            .execute(Request::new("mutation { removeFromCart(recordId: 99) { itemCount } }").data(ctx))
            .await;

        assert_eq!(response.errors.len(), 1);
        let extensions = response.errors[0].extensions.as_ref().unwrap();
        assert_eq!(
            extensions.get("code"),
            Some(&async_graphql::Value::from("NOT_FOUND"))
        );
    }

    #[tokio::test]
    async fn test_checkout_requires_user() {
        let (schema, app_state) = setup().await;
        let album = insert_album(&app_state.db, "Thriller", 999).await;
        let ctx = RequestContext::anonymous();
        run(&schema, &ctx, &format!("mutation {{ addToCart(albumId: {}) {{ count }} }}", album.id)).await;

        let checkout = r#"mutation { checkout(input: {
            firstName: "Ann", lastName: "Lee", address: "1 Main St", city: "Springfield",
            state: "IL", postalCode: "62701", country: "US", phone: "555-0100",
            email: "ann@example.com"
        }) { orderId } }"#;

        let response = schema.execute(Request::new(checkout).data(ctx.clone())).await;
        assert_eq!(response.errors.len(), 1);

        // Sign in: same session, now with a user name
        let signed_in = RequestContext::new(ctx.session.clone(), Some("ann".into()));
        let data = run(&schema, &signed_in, "mutation { migrateCart { cartId count } }").await;
        assert_eq!(data["migrateCart"]["cartId"], json!("ann"));
        assert_eq!(data["migrateCart"]["count"], json!(1));

        let data = run(&schema, &signed_in, checkout).await;
        let order_id = data["checkout"]["orderId"].as_i64().unwrap();

        let data = run(
            &schema,
            &signed_in,
            &format!("{{ order(id: {}) {{ username total details {{ quantity }} }} cart {{ count }} }}", order_id),
        )
        .await;
        assert_eq!(data["order"]["username"], json!("ann"));
        assert_eq!(data["order"]["details"].as_array().unwrap().len(), 1);
        assert_eq!(data["cart"]["count"], json!(0));
    }

    #[tokio::test]
    async fn test_top_selling_albums_query() {
        let (schema, app_state) = setup().await;
        insert_album(&app_state.db, "First", 100).await;
        insert_album(&app_state.db, "Second", 100).await;
        let ctx = RequestContext::new(Arc::new(Session::default()), None);

        let data = run(
            &schema,
            &ctx,
            "{ topSellingAlbums(count: 1) { salesCount album { title } } }",
        )
        .await;

        let albums = data["topSellingAlbums"].as_array().unwrap();
        assert_eq!(albums.len(), 1);
        assert_eq!(albums[0]["album"]["title"], json!("First"));
        assert_eq!(albums[0]["salesCount"], json!(0));
    }
}
