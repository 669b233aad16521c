use async_trait::async_trait;

use crate::features::location::models::{Coordinates, LocationFailure, PositionOptions};

/// Source of a single position fix
#[async_trait]
pub trait DeviceGeolocation: Send + Sync {
    async fn current_position(
        &self,
        options: &PositionOptions,
    ) -> Result<Coordinates, LocationFailure>;
}

/// Replays the fix (or failure) a browser reported to the server
#[derive(Debug, Clone, Copy)]
pub struct ReportedPosition(Result<Coordinates, LocationFailure>);

impl ReportedPosition {
    pub fn fix(coordinates: Coordinates) -> Self {
        Self(Ok(coordinates))
    }

    pub fn failure(failure: LocationFailure) -> Self {
        Self(Err(failure))
    }
}

#[async_trait]
impl DeviceGeolocation for ReportedPosition {
    async fn current_position(
        &self,
        _options: &PositionOptions,
    ) -> Result<Coordinates, LocationFailure> {
        self.0
    }
}
