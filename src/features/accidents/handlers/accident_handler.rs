use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use super::AccidentState;
use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, AppQuery};
use crate::features::accidents::dtos::{
    AssignTowDto, DispatchOutcomeDto, ListAccidentsQuery, NotifyClientDto,
};
use crate::features::accidents::models::{AccidentReport, ReportFilter};
use crate::shared::types::{ApiResponse, Meta};

/// List accident reports, newest first
#[utoipa::path(
    get,
    path = "/api/accidents",
    params(
        ("search" = Option<String>, Query, description = "Match reporter, phone, vehicle or address"),
        ("status" = Option<String>, Query, description = "pending, assigned or completed")
    ),
    responses(
        (status = 200, description = "Matching reports", body = ApiResponse<Vec<AccidentReport>>),
        (status = 400, description = "Invalid query parameters"),
        (status = 401, description = "Operator credentials required")
    ),
    tag = "accidents"
)]
pub async fn list_accidents(
    State(state): State<AccidentState>,
    AppQuery(query): AppQuery<ListAccidentsQuery>,
) -> Result<Json<ApiResponse<Vec<AccidentReport>>>> {
    let filter = ReportFilter::new(query.search, query.status);
    let reports = state.reports.list(&filter).await?;
    let total = reports.len() as i64;

    Ok(Json(ApiResponse::success(
        Some(reports),
        None,
        Some(Meta { total }),
    )))
}

/// Get an accident report
#[utoipa::path(
    get,
    path = "/api/accidents/{id}",
    params(
        ("id" = Uuid, Path, description = "Report ID")
    ),
    responses(
        (status = 200, description = "Report found", body = ApiResponse<AccidentReport>),
        (status = 404, description = "Report not found")
    ),
    tag = "accidents"
)]
pub async fn get_accident(
    State(state): State<AccidentState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<AccidentReport>>> {
    let report = state.reports.get(id).await?;
    Ok(Json(ApiResponse::success(Some(report), None, None)))
}

/// Assign a tow provider
///
/// Moves the report from `pending` to `assigned` and returns a WhatsApp link
/// that opens a chat with the provider.
#[utoipa::path(
    patch,
    path = "/api/accidents/{id}/assign-tow",
    params(
        ("id" = Uuid, Path, description = "Report ID")
    ),
    request_body = AssignTowDto,
    responses(
        (status = 200, description = "Provider assigned", body = ApiResponse<DispatchOutcomeDto>),
        (status = 404, description = "Report or provider not found"),
        (status = 409, description = "Report is not pending")
    ),
    tag = "accidents"
)]
pub async fn assign_tow(
    State(state): State<AccidentState>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<AssignTowDto>,
) -> Result<Json<ApiResponse<DispatchOutcomeDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let outcome = state.dispatch.assign(id, &dto.provider_name).await?;
    Ok(Json(ApiResponse::success(
        Some(outcome),
        Some("Tow provider assigned".to_string()),
        None,
    )))
}

/// Build the client notification link
#[utoipa::path(
    post,
    path = "/api/accidents/{id}/notify-client",
    params(
        ("id" = Uuid, Path, description = "Report ID")
    ),
    responses(
        (status = 200, description = "Client link built", body = ApiResponse<NotifyClientDto>),
        (status = 404, description = "Report not found"),
        (status = 412, description = "No provider assigned")
    ),
    tag = "accidents"
)]
pub async fn notify_client(
    State(state): State<AccidentState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<NotifyClientDto>>> {
    let dto = state.notifier.notify_client(id).await?;
    Ok(Json(ApiResponse::success(Some(dto), None, None)))
}

/// Mark an assigned report as completed
#[utoipa::path(
    patch,
    path = "/api/accidents/{id}/mark-completed",
    params(
        ("id" = Uuid, Path, description = "Report ID")
    ),
    responses(
        (status = 200, description = "Report completed", body = ApiResponse<AccidentReport>),
        (status = 404, description = "Report not found"),
        (status = 409, description = "Report is not assigned")
    ),
    tag = "accidents"
)]
pub async fn mark_completed(
    State(state): State<AccidentState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<AccidentReport>>> {
    let report = state.reports.mark_completed(id).await?;
    Ok(Json(ApiResponse::success(
        Some(report),
        Some("Accident report completed".to_string()),
        None,
    )))
}
