use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use utoipa::ToSchema;

use crate::shared::constants::ADDRESS_PLACEHOLDER;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Placeholder used for manually entered locations
    pub fn origin() -> Self {
        Self::new(0.0, 0.0)
    }

    pub fn is_origin(&self) -> bool {
        self.latitude == 0.0 && self.longitude == 0.0
    }

    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// How a report's location was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[sqlx(type_name = "location_source", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LocationSource {
    Device,
    Manual,
    None,
}

/// Why a position fix could not be obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Error)]
#[serde(rename_all = "snake_case")]
pub enum LocationFailure {
    #[error("permission denied")]
    PermissionDenied,
    #[error("position unavailable")]
    PositionUnavailable,
    #[error("timed out")]
    Timeout,
    #[error("unsupported")]
    Unsupported,
}

impl LocationFailure {
    /// Message shown to the reporter next to the retry and manual entry options
    pub fn reason(&self) -> &'static str {
        match self {
            LocationFailure::PermissionDenied => {
                "Location access was denied. Allow location access and retry, or enter the address manually."
            }
            LocationFailure::PositionUnavailable => {
                "Your position could not be determined. Retry, or enter the address manually."
            }
            LocationFailure::Timeout => {
                "Finding your location took too long. Retry, or enter the address manually."
            }
            LocationFailure::Unsupported => {
                "This device cannot share its location. Enter the address manually."
            }
        }
    }

    /// Parse a browser geolocation error code (1, 2, 3) or a failure name
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "1" | "permission_denied" => Some(LocationFailure::PermissionDenied),
            "2" | "position_unavailable" => Some(LocationFailure::PositionUnavailable),
            "3" | "timeout" => Some(LocationFailure::Timeout),
            "unsupported" => Some(LocationFailure::Unsupported),
            _ => None,
        }
    }
}

/// Options for a single position request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    pub high_accuracy: bool,
    pub timeout: Duration,
    /// Oldest cached fix that may be returned; zero forces a fresh one
    pub max_cache_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: Duration::from_secs(10),
            max_cache_age: Duration::ZERO,
        }
    }
}

impl PositionOptions {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedLocation {
    pub coordinates: Coordinates,
    pub address: String,
    pub source: LocationSource,
}

impl ResolvedLocation {
    pub fn manual(address: impl Into<String>) -> Self {
        Self {
            coordinates: Coordinates::origin(),
            address: address.into().trim().to_string(),
            source: LocationSource::Manual,
        }
    }

    /// False when the address is the "not available" placeholder
    pub fn has_address(&self) -> bool {
        !self.address.is_empty() && self.address != ADDRESS_PLACEHOLDER
    }
}

/// Per-session resolver state
#[derive(Debug, Clone, PartialEq)]
pub enum LocationState {
    Idle,
    Acquiring,
    Resolved(ResolvedLocation),
    Unavailable(LocationFailure),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AcquireError {
    #[error("location unavailable: {0}")]
    Failure(LocationFailure),
    /// A newer request replaced this one; its result was discarded
    #[error("superseded by a newer location request")]
    Superseded,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_from_browser_codes() {
        assert_eq!(LocationFailure::from_code("1"), Some(LocationFailure::PermissionDenied));
        assert_eq!(LocationFailure::from_code("2"), Some(LocationFailure::PositionUnavailable));
        assert_eq!(LocationFailure::from_code("3"), Some(LocationFailure::Timeout));
        assert_eq!(LocationFailure::from_code("Unsupported"), Some(LocationFailure::Unsupported));
        assert_eq!(LocationFailure::from_code("9"), None);
    }

    #[test]
    fn test_every_failure_has_a_reason() {
        for failure in [
            LocationFailure::PermissionDenied,
            LocationFailure::PositionUnavailable,
            LocationFailure::Timeout,
            LocationFailure::Unsupported,
        ] {
            assert!(failure.reason().contains("manually"));
        }
    }

    #[test]
    fn test_coordinates_bounds() {
        assert!(Coordinates::new(-33.92, 18.42).is_valid());
        assert!(Coordinates::origin().is_valid());
        assert!(!Coordinates::new(91.0, 0.0).is_valid());
        assert!(!Coordinates::new(0.0, -180.5).is_valid());
    }

    #[test]
    fn test_manual_location() {
        let location = ResolvedLocation::manual("  N1 near Paarl  ");
        assert!(location.coordinates.is_origin());
        assert_eq!(location.address, "N1 near Paarl");
        assert_eq!(location.source, LocationSource::Manual);
        assert!(location.has_address());
    }

    #[test]
    fn test_default_position_options() {
        let options = PositionOptions::default();
        assert!(options.high_accuracy);
        assert_eq!(options.timeout, Duration::from_secs(10));
        assert_eq!(options.max_cache_age, Duration::ZERO);
    }
}
