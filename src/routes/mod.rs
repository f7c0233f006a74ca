//! Router assembly: common endpoints at the root, entity endpoints under the admin prefix.

mod common;
mod entity;

pub use common::common_routes;
pub use entity::admin_routes;

use crate::state::AppState;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;

pub const ADMIN_PREFIX: &str = "/app/admin";

/// Full application router for the given state.
pub fn app(state: AppState) -> Router {
    let body_limit = state.config.body_limit_bytes;
    Router::new()
        .merge(common_routes(state.clone()))
        .nest(ADMIN_PREFIX, admin_routes(state))
        .layer(ServiceBuilder::new().layer(RequestBodyLimitLayer::new(body_limit)))
}
