use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::{Html, Redirect};

use crate::http_server::error::Report;
use crate::http_server::graphql::cart_mutations::{RemoveFromCartResult, remove_line};
use crate::http_server::http_routes::{escape_html, page};
use crate::http_server::session_cookies::{self, SessionJar};
use crate::http_server::state::AppState;
use crate::services::shopping_cart::ShoppingCartService;

pub async fn view_cart(
    State(app_state): State<Arc<AppState>>,
    jar: SessionJar,
    headers: HeaderMap,
) -> Result<(SessionJar, Html<String>), Report> {
    let request = session_cookies::request_context(&app_state, &jar, &headers);
    let cart = ShoppingCartService::for_request(app_state.db.clone(), &request);

    let lines = cart.get_cart_items().await?;
    let cart_count = cart.get_count().await?;
    let total = cart.get_total().await?;

    let mut body = String::from("<h1>Review your cart</h1>\n<table id=\"cart\">\n");
    body.push_str("<tr><th>Album</th><th>Price</th><th>Quantity</th><th></th></tr>\n");
    for line in &lines {
        body.push_str(&format!(
            "<tr id=\"row-{record_id}\"><td>{title}</td><td>${price}</td><td>{count}</td>\
             <td><form method=\"post\" action=\"/cart/remove/{record_id}\">\
             <button>Remove from cart</button></form></td></tr>\n",
            record_id = line.item.record_id,
            title = escape_html(&line.album.title),
            price = line.album.unit_price(),
            count = line.item.count,
        ));
    }
    body.push_str(&format!(
        "<tr><td>Total</td><td></td><td></td><td id=\"cart-total\">${total}</td></tr>\n</table>"
    ));

    let jar = session_cookies::write_session(jar, &request.session);
    Ok((jar, Html(page("Shopping Cart", cart_count, &body))))
}

pub async fn add_to_cart(
    State(app_state): State<Arc<AppState>>,
    Path(album_id): Path<i64>,
    jar: SessionJar,
    headers: HeaderMap,
) -> Result<(SessionJar, Redirect), Report> {
    let request = session_cookies::request_context(&app_state, &jar, &headers);
    let cart = ShoppingCartService::for_request(app_state.db.clone(), &request);

    cart.add_to_cart(album_id).await?;

    let jar = session_cookies::write_session(jar, &request.session);
    Ok((jar, Redirect::to("/cart")))
}

pub async fn remove_from_cart(
    State(app_state): State<Arc<AppState>>,
    Path(record_id): Path<i64>,
    jar: SessionJar,
    headers: HeaderMap,
) -> Result<(SessionJar, Json<RemoveFromCartResult>), Report> {
    let request = session_cookies::request_context(&app_state, &jar, &headers);
    let cart = ShoppingCartService::for_request(app_state.db.clone(), &request);

    let result = remove_line(&cart, record_id).await?;

    let jar = session_cookies::write_session(jar, &request.session);
    Ok((jar, Json(result)))
}
