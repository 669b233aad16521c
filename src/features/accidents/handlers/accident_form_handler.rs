use axum::{
    extract::{multipart::Field, Multipart, State},
    http::StatusCode,
    Json,
};
use tracing::debug;

use super::AccidentState;
use crate::core::error::{AppError, Result};
use crate::features::accidents::dtos::{
    AttachmentKind, AttachmentUpload, SubmissionOutcomeDto, SubmitAccidentFormDoc,
    SubmitAccidentReportDto,
};
use crate::features::location::LocationSource;
use crate::shared::constants::MAX_SCENE_IMAGES;
use crate::shared::types::ApiResponse;

async fn read_upload(field: Field<'_>, kind: AttachmentKind) -> Result<Option<AttachmentUpload>> {
    let content_type = field
        .content_type()
        .map(|s| s.to_string())
        .unwrap_or_else(|| "application/octet-stream".to_string());
    let file_name = field
        .file_name()
        .map(|s| s.to_string())
        .filter(|s| !s.is_empty());

    let data = field.bytes().await.map_err(|e| {
        debug!("Failed to read attachment bytes: {}", e);
        AppError::BadRequest(format!("Failed to read attachment data: {}", e))
    })?;

    // Browsers send an empty part for a file input left blank
    if data.is_empty() && file_name.is_none() {
        return Ok(None);
    }

    Ok(Some(AttachmentUpload {
        kind,
        file_name,
        content_type,
        data: data.to_vec(),
    }))
}

/// Read and discard a part past the attachment limits
async fn skip_upload(mut field: Field<'_>, kind: AttachmentKind) -> Result<()> {
    debug!("Skipping {:?} part over the limit", kind);
    while field
        .chunk()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read attachment data: {}", e)))?
        .is_some()
    {}
    Ok(())
}

fn optional_text(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_coordinate(field: &str, value: String) -> Result<Option<f64>> {
    optional_text(value)
        .map(|v| {
            v.parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .ok_or_else(|| AppError::BadRequest(format!("{} must be a number", field)))
        })
        .transpose()
}

fn parse_location_source(value: String) -> Result<Option<LocationSource>> {
    match optional_text(value).map(|v| v.to_lowercase()).as_deref() {
        None => Ok(None),
        Some("device") => Ok(Some(LocationSource::Device)),
        Some("manual") => Ok(Some(LocationSource::Manual)),
        Some("none") => Ok(Some(LocationSource::None)),
        Some(other) => Err(AppError::BadRequest(format!(
            "Unknown location source '{}'",
            other
        ))),
    }
}

/// Submit an accident report
///
/// Accepts multipart/form-data with the link token, the report fields, one
/// `registrationImage` and up to four `sceneImages`. Attachments that fail
/// are listed in `attachmentFailures`; the report is created regardless.
#[utoipa::path(
    post,
    path = "/api/accident-form",
    request_body(
        content = SubmitAccidentFormDoc,
        content_type = "multipart/form-data",
        description = "Accident form fields and photos",
    ),
    responses(
        (status = 201, description = "Report created", body = ApiResponse<SubmissionOutcomeDto>),
        (status = 400, description = "Missing or invalid fields"),
        (status = 401, description = "Invalid link token"),
        (status = 413, description = "Request too large")
    ),
    tag = "accident-form"
)]
pub async fn submit_accident_form(
    State(state): State<AccidentState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<SubmissionOutcomeDto>>)> {
    let mut token: Option<String> = None;
    let mut dto = SubmitAccidentReportDto::default();
    let mut uploads = Vec::new();
    let mut registration_kept = false;
    let mut scenes_kept = 0;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "registrationImage" | "registration_image" => {
                let kind = AttachmentKind::RegistrationImage;
                if registration_kept {
                    skip_upload(field, kind).await?;
                } else if let Some(upload) = read_upload(field, kind).await? {
                    registration_kept = true;
                    uploads.push(upload);
                }
                continue;
            }
            "sceneImages" | "sceneImages[]" | "scene_images" => {
                let kind = AttachmentKind::SceneImage;
                if scenes_kept >= MAX_SCENE_IMAGES {
                    skip_upload(field, kind).await?;
                } else if let Some(upload) = read_upload(field, kind).await? {
                    scenes_kept += 1;
                    uploads.push(upload);
                }
                continue;
            }
            _ => {}
        }

        let text = field.text().await.map_err(|e| {
            AppError::BadRequest(format!("Failed to read field '{}': {}", field_name, e))
        })?;

        match field_name.as_str() {
            "token" => token = optional_text(text),
            "reporterName" | "name" => dto.reporter_name = text,
            "reporterPhone" | "phone" => dto.reporter_phone = text,
            "vehicleMake" => dto.vehicle_make = text,
            "vehicleModel" => dto.vehicle_model = text,
            "description" => dto.description = optional_text(text),
            "insuranceCompany" => dto.insurance_company = optional_text(text),
            "latitude" | "lat" => dto.latitude = parse_coordinate("latitude", text)?,
            "longitude" | "lng" => dto.longitude = parse_coordinate("longitude", text)?,
            "address" => dto.address = optional_text(text),
            "locationSource" => dto.location_source = parse_location_source(text)?,
            _ => debug!("Ignoring unknown field: {}", field_name),
        }
    }

    let token =
        token.ok_or_else(|| AppError::InvalidToken("Link token is required".to_string()))?;

    let outcome = state.intake.submit(&token, dto, uploads).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(outcome),
            Some("Accident report submitted".to_string()),
            None,
        )),
    ))
}
