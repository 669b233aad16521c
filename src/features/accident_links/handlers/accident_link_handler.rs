use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::accident_links::dtos::{CreateAccidentLinkDto, IssuedLinkDto};
use crate::features::accident_links::models::BoundIdentity;
use crate::features::accident_links::services::LinkTokenService;
use crate::shared::types::ApiResponse;

/// Issue an accident form link for a client
#[utoipa::path(
    post,
    path = "/api/accident-links",
    request_body = CreateAccidentLinkDto,
    responses(
        (status = 201, description = "Link issued", body = ApiResponse<IssuedLinkDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Operator credentials required")
    ),
    tag = "accident-links"
)]
pub async fn issue_link(
    State(service): State<Arc<LinkTokenService>>,
    AppJson(dto): AppJson<CreateAccidentLinkDto>,
) -> Result<(StatusCode, Json<ApiResponse<IssuedLinkDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let issued = service.issue(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(issued),
            Some("Link issued".to_string()),
            None,
        )),
    ))
}

/// Validate a link token
///
/// Does not consume the token; it may be validated any number of times.
#[utoipa::path(
    get,
    path = "/api/accident-links/validate/{token}",
    params(
        ("token" = String, Path, description = "Link token")
    ),
    responses(
        (status = 200, description = "Token is valid", body = ApiResponse<BoundIdentity>),
        (status = 401, description = "Token unknown, consumed or expired")
    ),
    tag = "accident-links"
)]
pub async fn validate_link(
    State(service): State<Arc<LinkTokenService>>,
    Path(token): Path<String>,
) -> Result<Json<ApiResponse<BoundIdentity>>> {
    let identity = service.validate(&token).await?;
    Ok(Json(ApiResponse::success(Some(identity), None, None)))
}

/// Consume a link token
#[utoipa::path(
    post,
    path = "/api/accident-links/consume/{token}",
    params(
        ("token" = String, Path, description = "Link token")
    ),
    responses(
        (status = 200, description = "Token consumed", body = ApiResponse<BoundIdentity>),
        (status = 401, description = "Token unknown, consumed or expired")
    ),
    tag = "accident-links"
)]
pub async fn consume_link(
    State(service): State<Arc<LinkTokenService>>,
    Path(token): Path<String>,
) -> Result<Json<ApiResponse<BoundIdentity>>> {
    let identity = service.consume(&token).await?;
    Ok(Json(ApiResponse::success(
        Some(identity),
        Some("Link consumed".to_string()),
        None,
    )))
}
