use std::sync::Arc;

use axum::{
    Extension, Router,
    routing::{get, post},
};
use color_eyre::eyre::{Context, eyre};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
#[cfg(not(debug_assertions))]
use tower_http::cors::{AllowMethods, AllowOrigin};
use tower_http::trace::TraceLayer;

use crate::{
    config::Config,
    database::Database,
    http_server::{graphql, http_routes, state::AppState},
};

pub struct HttpServerConfig {
    pub port: u16,
    pub database: Database,
    pub config: Config,
    /// Origin allowed by CORS in release builds
    pub base_url: String,
}

pub fn router(app_state: Arc<AppState>, base_url: &str) -> color_eyre::Result<Router> {
    let schema = graphql::create_schema(app_state.clone());

    #[cfg(debug_assertions)]
    let cors_layer = {
        let _ = base_url;
        CorsLayer::permissive()
    };

    #[cfg(not(debug_assertions))]
    let cors_layer = CorsLayer::new()
        .allow_origin(AllowOrigin::exact(
            base_url
                .parse()
                .wrap_err_with(|| eyre!("Invalid base url: {}", base_url))?,
        ))
        .allow_methods(AllowMethods::any());

    Ok(Router::new()
        .route("/", get(http_routes::home::home))
        .route("/cart", get(http_routes::cart::view_cart))
        .route("/cart/add/{album_id}", get(http_routes::cart::add_to_cart))
        .route(
            "/cart/remove/{record_id}",
            post(http_routes::cart::remove_from_cart),
        )
        .route(
            "/graphql",
            get(graphql::graphiql).post(graphql::graphql_handler),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer)
                .layer(Extension(schema)),
        )
        .with_state(app_state))
}

pub async fn start(
    HttpServerConfig {
        port,
        database,
        config,
        base_url,
    }: HttpServerConfig,
) -> color_eyre::Result<()> {
    let app_state = Arc::new(AppState::new(Arc::new(database), config)?);

    let app = router(app_state, &base_url)?;

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .wrap_err_with(|| eyre!("Failed to bind to port {}", port))?;
    log::info!("Listening on http://0.0.0.0:{}", port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .wrap_err("Failed to start HTTP server")?;

    log::info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::shopping_cart::{CART_SESSION_KEY, ShoppingCartService};
    use crate::test_utils::{insert_album, test_db};
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use axum::response::IntoResponse;
    use axum_extra::extract::cookie::{Cookie, SignedCookieJar};
    use serde_json::Value;
    use tower::util::ServiceExt;

    async fn setup() -> (Router, Arc<AppState>) {
        let app_state = Arc::new(AppState::new(test_db().await, Config::default()).unwrap());
        let app = router(app_state.clone(), "http://localhost:3000").unwrap();
        (app, app_state)
    }

    /// `CartId=<signed value>` as the server would have issued it
    fn cart_cookie(app_state: &AppState, cart_id: &str) -> String {
        let response = SignedCookieJar::new(app_state.cookie_key.clone())
            .add(Cookie::new(CART_SESSION_KEY, cart_id.to_string()))
            .into_response();
        let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        set_cookie.split(';').next().unwrap().to_string()
    }

    fn request(method: &str, uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    fn graphql_request(query: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/graphql")
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder
            .body(Body::from(serde_json::json!({ "query": query }).to_string()))
            .unwrap()
    }

    async fn body_text(body: Body) -> String {
        let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_home_assigns_cart_cookie() {
        let (app, app_state) = setup().await;
        insert_album(&app_state.db, "Back in <Black>", 899).await;

        let response = app.oneshot(request("GET", "/", None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            .unwrap()
            .to_string();
        assert!(cookie.starts_with(&format!("{}=", CART_SESSION_KEY)));

        let body = body_text(response.into_body()).await;
        assert!(body.contains("Back in &lt;Black&gt;"));
        assert!(body.contains("Cart (0)"));
    }

    #[tokio::test]
    async fn test_existing_cart_cookie_is_not_rewritten() {
        let (app, app_state) = setup().await;
        let cookie = cart_cookie(&app_state, "known-cart");

        let response = app
            .oneshot(request("GET", "/", Some(&cookie)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(header::SET_COOKIE).is_none());
    }

    #[tokio::test]
    async fn test_forged_cart_cookie_cannot_reach_named_cart() {
        let (app, app_state) = setup().await;
        let album = insert_album(&app_state.db, "Abbey Road", 899).await;
        let alice = ShoppingCartService::new(app_state.db.clone(), "alice");
        alice.add_to_cart(album.id).await.unwrap();

        let forged = format!("{}=alice", CART_SESSION_KEY);

        let response = app
            .clone()
            .oneshot(request("GET", "/cart", Some(&forged)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        // A fresh identity is issued instead
        assert!(response.headers().get(header::SET_COOKIE).is_some());
        assert!(!body_text(response.into_body()).await.contains("Abbey Road"));

        let response = app
            .clone()
            .oneshot(graphql_request("mutation { emptyCart }", Some(&forged)))
            .await
            .unwrap();
        let json: Value = serde_json::from_str(&body_text(response.into_body()).await).unwrap();
        assert_eq!(json["data"]["emptyCart"], 0);

        // Signed cookie for another cart with the value swapped to alice
        let tampered = cart_cookie(&app_state, "mallory").replace("mallory", "alice");
        let response = app
            .oneshot(graphql_request("{ cart { cartId count } }", Some(&tampered)))
            .await
            .unwrap();
        let json: Value = serde_json::from_str(&body_text(response.into_body()).await).unwrap();
        assert_ne!(json["data"]["cart"]["cartId"], "alice");
        assert_eq!(json["data"]["cart"]["count"], 0);

        assert_eq!(alice.get_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_add_then_view_then_remove() {
        let (app, app_state) = setup().await;
        let album = insert_album(&app_state.db, "Rumours", 899).await;
        let cookie = cart_cookie(&app_state, "web-cart");

        let response = app
            .clone()
            .oneshot(request("GET", &format!("/cart/add/{}", album.id), Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/cart");

        let response = app
            .clone()
            .oneshot(request("GET", "/cart", Some(&cookie)))
            .await
            .unwrap();
        let body = body_text(response.into_body()).await;
        assert!(body.contains("Rumours"));
        assert!(body.contains("$8.99"));

        let items = ShoppingCartService::new(app_state.db.clone(), "web-cart")
            .get_cart_items()
            .await
            .unwrap();
        let record_id = items[0].item.record_id;

        let response = app
            .oneshot(request(
                "POST",
                &format!("/cart/remove/{}", record_id),
                Some(&cookie),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json: Value = serde_json::from_str(&body_text(response.into_body()).await).unwrap();
        assert_eq!(json["message"], "Rumours has been removed from your shopping cart.");
        assert_eq!(json["itemCount"], 0);
        assert_eq!(json["cartCount"], 0);
        assert_eq!(json["deleteId"], record_id);
    }

    #[tokio::test]
    async fn test_cart_errors_map_to_status_codes() {
        let (app, app_state) = setup().await;
        let cookie = cart_cookie(&app_state, "web-cart");

        let response = app
            .clone()
            .oneshot(request("GET", "/cart/add/404", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app
            .oneshot(request("POST", "/cart/remove/7", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_graphql_post_sets_cookie() {
        let (app, _app_state) = setup().await;

        let response = app
            .oneshot(graphql_request("{ cart { count } }", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(header::SET_COOKIE).is_some());
        let json: Value = serde_json::from_str(&body_text(response.into_body()).await).unwrap();
        assert_eq!(json["data"]["cart"]["count"], 0);
    }
}
