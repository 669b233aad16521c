use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::accident_links::handlers;
use crate::features::accident_links::services::LinkTokenService;

/// Routes the reporting client reaches through the form link
pub fn public_routes(service: Arc<LinkTokenService>) -> Router {
    Router::new()
        .route(
            "/api/accident-links/validate/{token}",
            get(handlers::validate_link),
        )
        .with_state(service)
}

/// Routes used by dispatch operators
pub fn operator_routes(service: Arc<LinkTokenService>) -> Router {
    Router::new()
        .route("/api/accident-links", post(handlers::issue_link))
        .route(
            "/api/accident-links/consume/{token}",
            post(handlers::consume_link),
        )
        .with_state(service)
}
