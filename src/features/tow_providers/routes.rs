use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::tow_providers::handlers;
use crate::features::tow_providers::services::ProviderDirectory;

/// Create routes for the tow providers feature (operator facing)
pub fn routes(directory: Arc<dyn ProviderDirectory>) -> Router {
    Router::new()
        .route("/api/tow-providers", get(handlers::list_tow_providers))
        .with_state(directory)
}
