use std::sync::Arc;

use async_graphql::Context;

use crate::http_server::{graphql_error::GraphqlError, state::AppState};
use crate::session::RequestContext;

pub fn get_app_state<'a>(ctx: &Context<'a>) -> Result<&'a Arc<AppState>, GraphqlError> {
    ctx.data::<Arc<AppState>>()
        .map_err(|_| GraphqlError::FailedToGetAppState)
}

pub fn get_request_context<'a>(ctx: &Context<'a>) -> Result<&'a RequestContext, GraphqlError> {
    ctx.data::<RequestContext>()
        .map_err(|_| GraphqlError::FailedToGetRequestContext)
}

/// The authenticated user name, required by checkout and order lookups.
pub fn require_user_name<'a>(ctx: &Context<'a>) -> Result<&'a str, GraphqlError> {
    get_request_context(ctx)?
        .user_name()
        .ok_or(GraphqlError::Unauthenticated)
}
