use std::sync::Arc;

use axum::{extract::State, Json};

use crate::core::error::Result;
use crate::features::tow_providers::models::TowProvider;
use crate::features::tow_providers::services::ProviderDirectory;
use crate::shared::types::{ApiResponse, Meta};

/// List tow providers
#[utoipa::path(
    get,
    path = "/api/tow-providers",
    responses(
        (status = 200, description = "Tow providers in directory order", body = ApiResponse<Vec<TowProvider>>),
        (status = 401, description = "Operator credentials required")
    ),
    tag = "tow-providers"
)]
pub async fn list_tow_providers(
    State(directory): State<Arc<dyn ProviderDirectory>>,
) -> Result<Json<ApiResponse<Vec<TowProvider>>>> {
    let providers = directory.providers();
    let total = providers.len() as i64;
    Ok(Json(ApiResponse::success(
        Some(providers),
        None,
        Some(Meta { total }),
    )))
}
