use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::location::models::{LocationFailure, ResolvedLocation};

/// Browser geolocation error as sent by the form, either the numeric
/// `GeolocationPositionError.code` or a failure name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum FailureCode {
    Numeric(u16),
    Named(String),
}

impl FailureCode {
    pub fn to_failure(&self) -> Option<LocationFailure> {
        match self {
            FailureCode::Numeric(code) => LocationFailure::from_code(&code.to_string()),
            FailureCode::Named(name) => LocationFailure::from_code(name),
        }
    }
}

/// Request DTO for resolving a reporter's location
///
/// Exactly one of `lat`/`lng`, `errorCode` or `manualAddress` is expected;
/// a manual address wins when several are present.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResolveLocationDto {
    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,

    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub lat: Option<f64>,

    #[validate(range(min = -180.0, max = 180.0, message = "Longitude must be between -180 and 180"))]
    pub lng: Option<f64>,

    pub error_code: Option<FailureCode>,

    #[validate(length(max = 500, message = "Address must not exceed 500 characters"))]
    pub manual_address: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LocationResolutionStatus {
    Resolved,
    Unavailable,
}

/// Response DTO for a location resolution attempt
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LocationResolutionDto {
    pub status: LocationResolutionStatus,
    pub location: Option<ResolvedLocation>,
    pub failure: Option<LocationFailure>,
    pub reason: Option<String>,
    pub can_retry: bool,
    /// Manual address entry is always offered
    pub manual_entry: bool,
}

impl LocationResolutionDto {
    pub fn resolved(location: ResolvedLocation) -> Self {
        Self {
            status: LocationResolutionStatus::Resolved,
            location: Some(location),
            failure: None,
            reason: None,
            can_retry: true,
            manual_entry: true,
        }
    }

    pub fn unavailable(failure: LocationFailure) -> Self {
        Self {
            status: LocationResolutionStatus::Unavailable,
            location: None,
            failure: Some(failure),
            reason: Some(failure.reason().to_string()),
            can_retry: true,
            manual_entry: true,
        }
    }
}
