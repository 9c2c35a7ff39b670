use axum::{
    body::Body,
    http::{Response, StatusCode},
    response::IntoResponse,
};

use crate::services::shopping_cart::CartError;

// A generic error report
// Produced via `Err(some_err).wrap_err("Some context")`
// or `Err(color_eyre::eyre::Report::new(SomeError))`
pub struct Report(color_eyre::Report);

impl std::fmt::Debug for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl<E> From<E> for Report
where
    E: Into<color_eyre::Report>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

// Tell axum how to convert `Report` into a response.
impl IntoResponse for Report {
    fn into_response(self) -> Response<Body> {
        let err = self.0;

        if let Some(cart_error) = err.downcast_ref::<CartError>() {
            let status = match cart_error {
                CartError::AlbumNotFound(_) | CartError::LineItemNotFound { .. } => {
                    StatusCode::NOT_FOUND
                }
                CartError::EmptyCart(_) => StatusCode::BAD_REQUEST,
                CartError::DuplicateLineItems { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            };
            log::warn!("{cart_error}");
            return (status, cart_error.to_string()).into_response();
        }

        log::error!("{err:?}");

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Something went wrong".to_string(),
        )
            .into_response()
    }
}
