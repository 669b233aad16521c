use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::AttachmentFailure;
use crate::features::accidents::models::{AccidentReport, ReportStatus};
use crate::features::location::LocationSource;
use crate::shared::validation::{validate_not_blank, validate_phone_input};

/// Text fields of the accident form
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAccidentReportDto {
    #[validate(
        length(max = 128, message = "Reporter name must not exceed 128 characters"),
        custom(function = "validate_not_blank", message = "Reporter name is required")
    )]
    pub reporter_name: String,

    #[validate(
        length(max = 32, message = "Phone must not exceed 32 characters"),
        custom(function = "validate_not_blank", message = "Phone is required"),
        custom(
            function = "validate_phone_input",
            message = "Phone must be a number of 7 to 15 digits"
        )
    )]
    pub reporter_phone: String,

    #[validate(
        length(max = 128, message = "Vehicle make must not exceed 128 characters"),
        custom(function = "validate_not_blank", message = "Vehicle make is required")
    )]
    pub vehicle_make: String,

    #[validate(
        length(max = 128, message = "Vehicle model must not exceed 128 characters"),
        custom(function = "validate_not_blank", message = "Vehicle model is required")
    )]
    pub vehicle_model: String,

    #[validate(length(max = 2000, message = "Description must not exceed 2000 characters"))]
    pub description: Option<String>,

    #[validate(length(max = 128, message = "Insurance company must not exceed 128 characters"))]
    pub insurance_company: Option<String>,

    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub latitude: Option<f64>,

    #[validate(range(min = -180.0, max = 180.0, message = "Longitude must be between -180 and 180"))]
    pub longitude: Option<f64>,

    #[validate(length(max = 500, message = "Address must not exceed 500 characters"))]
    pub address: Option<String>,

    /// How the location was obtained; inferred when omitted
    pub location_source: Option<LocationSource>,
}

impl SubmitAccidentReportDto {
    /// Coordinates must be finite and arrive as a pair
    pub fn check_coordinates(&self) -> Result<(), String> {
        match (self.latitude, self.longitude) {
            (None, None) => Ok(()),
            (Some(lat), Some(lng)) if lat.is_finite() && lng.is_finite() => Ok(()),
            (Some(_), Some(_)) => Err("Coordinates must be finite numbers".to_string()),
            _ => Err("Latitude and longitude must be sent together".to_string()),
        }
    }

    /// Explicit source, else device when coordinates were sent, else manual
    /// when only an address was typed
    pub fn resolved_location_source(&self) -> LocationSource {
        if let Some(source) = self.location_source {
            return source;
        }

        let has_fix = matches!(
            (self.latitude, self.longitude),
            (Some(lat), Some(lng)) if lat != 0.0 || lng != 0.0
        );
        let has_address = self
            .address
            .as_deref()
            .is_some_and(|a| !a.trim().is_empty());

        if has_fix {
            LocationSource::Device
        } else if has_address {
            LocationSource::Manual
        } else {
            LocationSource::None
        }
    }
}

/// Accident form request for OpenAPI documentation.
/// The handler reads the multipart body directly.
#[derive(Debug, ToSchema)]
#[schema(rename_all = "camelCase")]
#[allow(dead_code)]
pub struct SubmitAccidentFormDoc {
    /// Token from the form link
    pub token: String,
    pub reporter_name: String,
    pub reporter_phone: String,
    pub vehicle_make: String,
    pub vehicle_model: String,
    pub description: Option<String>,
    pub insurance_company: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<String>,
    #[schema(example = "device")]
    pub location_source: Option<String>,
    /// Vehicle registration photo; only the first is kept
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub registration_image: Option<String>,
    /// Scene photos; only the first 4 are kept
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub scene_images: Option<Vec<String>>,
}

/// Response DTO for a submitted accident form
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionOutcomeDto {
    pub report: AccidentReport,
    pub attachment_failures: Vec<AttachmentFailure>,
}

/// Query params for the operator report list
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ListAccidentsQuery {
    /// Matches reporter name, phone, vehicle make, model or address
    pub search: Option<String>,
    pub status: Option<ReportStatus>,
}

/// Request DTO for assigning a tow provider
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignTowDto {
    #[serde(alias = "towCompany")]
    #[validate(length(min = 1, max = 128, message = "Provider name must be 1-128 characters"))]
    pub provider_name: String,
}

/// Response DTO for a dispatched report
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DispatchOutcomeDto {
    pub report: AccidentReport,
    /// WhatsApp link that opens a chat with the provider
    pub wa_link: String,
}

/// Response DTO for a client notification link
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotifyClientDto {
    pub wa_link: String,
}
