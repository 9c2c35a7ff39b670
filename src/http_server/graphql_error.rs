use async_graphql::{Error, ErrorExtensions};

use crate::services::shopping_cart::CartError;

#[derive(Debug, Clone, thiserror::Error)]
pub enum GraphqlError {
    #[error("Server error: {0}")]
    ServerError(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Data error: {0}")]
    DataError(String),
    #[error("Sign in required")]
    Unauthenticated,
    #[error("Failed to get app state")]
    FailedToGetAppState,
    #[error("Failed to get request context")]
    FailedToGetRequestContext,
}

impl GraphqlError {
    fn code(&self) -> &'static str {
        match self {
            GraphqlError::ServerError(_)
            | GraphqlError::FailedToGetAppState
            | GraphqlError::FailedToGetRequestContext => "INTERNAL_SERVER_ERROR",
            GraphqlError::NotFound(_) => "NOT_FOUND",
            GraphqlError::BadRequest(_) => "BAD_REQUEST",
            GraphqlError::DataError(_) => "DATA_ERROR",
            GraphqlError::Unauthenticated => "UNAUTHENTICATED",
        }
    }
}

impl From<color_eyre::Report> for GraphqlError {
    fn from(report: color_eyre::Report) -> Self {
        if let Some(cart_error) = report.downcast_ref::<CartError>() {
            log::warn!("GraphQL cart error: {}", cart_error);
            let reason = cart_error.to_string();
            return match cart_error {
                CartError::AlbumNotFound(_) | CartError::LineItemNotFound { .. } => {
                    Self::NotFound(reason)
                }
                CartError::EmptyCart(_) => Self::BadRequest(reason),
                CartError::DuplicateLineItems { .. } => Self::DataError(reason),
            };
        }

        // Log the full error report with trace chain for debugging
        log::error!("GraphQL error: {:#?}", report);
        Self::ServerError(report.to_string())
    }
}

impl ErrorExtensions for GraphqlError {
    fn extend(&self) -> Error {
        Error::new(format!("{}", self)).extend_with(|_err, e| {
            e.set("code", self.code());
            match self {
                GraphqlError::ServerError(reason)
                | GraphqlError::NotFound(reason)
                | GraphqlError::BadRequest(reason)
                | GraphqlError::DataError(reason) => e.set("reason", reason.clone()),
                GraphqlError::Unauthenticated => e.set("reason", "Sign in required".to_string()),
                GraphqlError::FailedToGetAppState => {
                    e.set("reason", "Failed to get app state".to_string())
                }
                GraphqlError::FailedToGetRequestContext => {
                    e.set("reason", "Failed to get request context".to_string())
                }
            }
        })
    }
}

// Newtype wrapper to avoid blanket From implementation conflict for GraphqlError and async_graphql::Error
#[derive(Debug, Clone)]
pub struct GraphqlErrorWrapper(GraphqlError);

impl From<GraphqlError> for GraphqlErrorWrapper {
    fn from(err: GraphqlError) -> Self {
        Self(err)
    }
}

impl From<GraphqlErrorWrapper> for Error {
    fn from(wrapper: GraphqlErrorWrapper) -> Self {
        wrapper.0.extend()
    }
}

// Make it easy to convert from color_eyre::Report
impl From<color_eyre::Report> for GraphqlErrorWrapper {
    fn from(report: color_eyre::Report) -> Self {
        GraphqlError::from(report).into()
    }
}

pub type GraphqlResult<T> = Result<T, GraphqlErrorWrapper>;
