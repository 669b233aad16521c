use std::sync::Arc;

use super::{LocationResolver, ReportedPosition};
use crate::core::error::{AppError, Result};
use crate::features::accident_links::LinkTokenService;
use crate::features::location::dtos::{LocationResolutionDto, ResolveLocationDto};
use crate::features::location::models::{AcquireError, Coordinates, PositionOptions, ResolvedLocation};
use crate::modules::geocoding::Geocoder;

/// Resolves the location a reporter's browser sent along with their form token
pub struct LocationService {
    links: Arc<LinkTokenService>,
    geocoder: Arc<dyn Geocoder>,
    options: PositionOptions,
}

impl LocationService {
    pub fn new(
        links: Arc<LinkTokenService>,
        geocoder: Arc<dyn Geocoder>,
        options: PositionOptions,
    ) -> Self {
        Self {
            links,
            geocoder,
            options,
        }
    }

    pub async fn resolve(&self, dto: ResolveLocationDto) -> Result<LocationResolutionDto> {
        self.links.validate(&dto.token).await?;

        if let Some(address) = dto.manual_address.filter(|a| !a.trim().is_empty()) {
            return Ok(LocationResolutionDto::resolved(ResolvedLocation::manual(
                address,
            )));
        }

        let device = match (&dto.error_code, dto.lat, dto.lng) {
            (Some(code), _, _) => {
                let failure = code.to_failure().ok_or_else(|| {
                    AppError::BadRequest(format!("Unknown location error code: {:?}", code))
                })?;
                ReportedPosition::failure(failure)
            }
            (None, Some(lat), Some(lng)) => {
                let coordinates = Coordinates::new(lat, lng);
                if !coordinates.is_valid() {
                    return Err(AppError::Validation(
                        "Coordinates are out of range".to_string(),
                    ));
                }
                ReportedPosition::fix(coordinates)
            }
            _ => {
                return Err(AppError::BadRequest(
                    "Provide lat and lng, errorCode or manualAddress".to_string(),
                ))
            }
        };

        let resolver = LocationResolver::new(Arc::new(device), self.geocoder.clone(), self.options);

        into_resolution(resolver.acquire().await)
    }
}

fn into_resolution(
    outcome: std::result::Result<ResolvedLocation, AcquireError>,
) -> Result<LocationResolutionDto> {
    match outcome {
        Ok(location) => Ok(LocationResolutionDto::resolved(location)),
        Err(AcquireError::Failure(failure)) => Ok(LocationResolutionDto::unavailable(failure)),
        // Each request owns its resolver, so nothing else can start a newer acquire
        Err(AcquireError::Superseded) => Err(AppError::InvalidStateTransition(
            "Location request was superseded by a newer one".to_string(),
        )),
    }
}
