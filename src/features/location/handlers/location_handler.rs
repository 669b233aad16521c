use std::sync::Arc;

use axum::{extract::State, Json};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::location::dtos::{LocationResolutionDto, ResolveLocationDto};
use crate::features::location::services::LocationService;
use crate::shared::types::ApiResponse;

/// Resolve the reporter's location
///
/// A location failure is not an error: the response carries the reason and
/// the retry and manual-entry options.
#[utoipa::path(
    post,
    path = "/api/accident-form/location",
    request_body = ResolveLocationDto,
    responses(
        (status = 200, description = "Resolved location or failure reason", body = ApiResponse<LocationResolutionDto>),
        (status = 400, description = "Malformed request"),
        (status = 401, description = "Invalid link token")
    ),
    tag = "accident-form"
)]
pub async fn resolve_location(
    State(service): State<Arc<LocationService>>,
    AppJson(dto): AppJson<ResolveLocationDto>,
) -> Result<Json<ApiResponse<LocationResolutionDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let resolution = service.resolve(dto).await?;
    Ok(Json(ApiResponse::success(Some(resolution), None, None)))
}
