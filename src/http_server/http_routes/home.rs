use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Html;

use crate::http_server::error::Report;
use crate::http_server::http_routes::{escape_html, page};
use crate::http_server::session_cookies::{self, SessionJar};
use crate::http_server::state::AppState;
use crate::services::catalog::CatalogService;
use crate::services::shopping_cart::ShoppingCartService;

/// Landing page listing the best selling albums.
pub async fn home(
    State(app_state): State<Arc<AppState>>,
    jar: SessionJar,
    headers: HeaderMap,
) -> Result<(SessionJar, Html<String>), Report> {
    let request = session_cookies::request_context(&app_state, &jar, &headers);
    let catalog = CatalogService::new(app_state.db.clone());
    let cart = ShoppingCartService::for_request(app_state.db.clone(), &request);

    let albums = catalog
        .top_selling_albums(app_state.config.http.top_selling_count)
        .await?;
    let cart_count = cart.get_count().await?;

    let mut body = String::from("<h1>Fresh off the grill</h1>\n<ul id=\"album-list\">\n");
    for entry in &albums {
        body.push_str(&format!(
            "<li><a href=\"/cart/add/{id}\">{title}</a> ${price}</li>\n",
            id = entry.album.id,
            title = escape_html(&entry.album.title),
            price = entry.album.unit_price(),
        ));
    }
    body.push_str("</ul>");

    let jar = session_cookies::write_session(jar, &request.session);
    Ok((jar, Html(page("Home", cart_count, &body))))
}
