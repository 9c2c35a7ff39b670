use std::sync::Arc;

use axum::extract::FromRef;
use axum::http::HeaderMap;
use axum_extra::extract::cookie::{Cookie, Key, SameSite, SignedCookieJar};

use crate::http_server::state::AppState;
use crate::services::shopping_cart::CART_SESSION_KEY;
use crate::session::{RequestContext, Session};

/// Session keys persisted as cookies
const SESSION_KEYS: &[&str] = &[CART_SESSION_KEY];

/// Key used to sign and verify the session cookies.
#[derive(Clone)]
pub struct CookieKey(Key);

impl FromRef<Arc<AppState>> for CookieKey {
    fn from_ref(app_state: &Arc<AppState>) -> Self {
        Self(app_state.cookie_key.clone())
    }
}

impl From<CookieKey> for Key {
    fn from(key: CookieKey) -> Self {
        key.0
    }
}

/// Session cookies. Unsigned or tampered cookies are dropped on extraction.
pub type SessionJar = SignedCookieJar<CookieKey>;

/// Build the request context from the session cookies and the proxy user header.
pub fn request_context(app_state: &AppState, jar: &SessionJar, headers: &HeaderMap) -> RequestContext {
    let session = Session::from_values(SESSION_KEYS.iter().filter_map(|key| {
        jar.get(key)
            .map(|cookie| (key.to_string(), cookie.value().to_string()))
    }));

    let user_name = headers
        .get(app_state.config.http.user_header.as_str())
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    RequestContext::new(Arc::new(session), user_name)
}

/// Write the session back to the response cookies.
pub fn write_session(mut jar: SessionJar, session: &Session) -> SessionJar {
    for (key, value) in session.values() {
        if jar.get(&key).is_some_and(|cookie| cookie.value() == value) {
            continue;
        }
        jar = jar.add(
            Cookie::build((key, value))
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax),
        );
    }
    jar
}
