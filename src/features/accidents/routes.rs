use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
    Router,
};

use crate::features::accidents::handlers::{self, AccidentState};
use crate::shared::constants::MAX_FORM_BODY_SIZE;

/// Public form submission (token gated)
pub fn public_routes(state: AccidentState) -> Router {
    Router::new()
        .route(
            "/api/accident-form",
            post(handlers::submit_accident_form).layer(DefaultBodyLimit::max(MAX_FORM_BODY_SIZE)),
        )
        .with_state(state)
}

/// Dispatch operator routes
pub fn operator_routes(state: AccidentState) -> Router {
    Router::new()
        .route("/api/accidents", get(handlers::list_accidents))
        .route("/api/accidents/{id}", get(handlers::get_accident))
        .route("/api/accidents/{id}/assign-tow", patch(handlers::assign_tow))
        .route(
            "/api/accidents/{id}/notify-client",
            post(handlers::notify_client),
        )
        .route(
            "/api/accidents/{id}/mark-completed",
            patch(handlers::mark_completed),
        )
        .with_state(state)
}
