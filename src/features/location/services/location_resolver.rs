use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tracing::{debug, warn};

use super::DeviceGeolocation;
use crate::features::location::models::{
    AcquireError, Coordinates, LocationFailure, LocationSource, LocationState, PositionOptions,
    ResolvedLocation,
};
use crate::modules::geocoding::Geocoder;
use crate::shared::constants::ADDRESS_PLACEHOLDER;

/// One reporter's location session: `idle -> acquiring -> resolved | unavailable`.
///
/// Only the latest request may settle the state. Each request bumps a
/// generation counter, and an in-flight request that sees a newer generation
/// gives up with [`AcquireError::Superseded`].
pub struct LocationResolver {
    device: Arc<dyn DeviceGeolocation>,
    geocoder: Arc<dyn Geocoder>,
    options: PositionOptions,
    state: RwLock<LocationState>,
    generation: watch::Sender<u64>,
}

impl LocationResolver {
    pub fn new(
        device: Arc<dyn DeviceGeolocation>,
        geocoder: Arc<dyn Geocoder>,
        options: PositionOptions,
    ) -> Self {
        let (generation, _) = watch::channel(0);
        Self {
            device,
            geocoder,
            options,
            state: RwLock::new(LocationState::Idle),
            generation,
        }
    }

    pub async fn state(&self) -> LocationState {
        self.state.read().await.clone()
    }

    /// Request a fix and resolve its address, superseding any outstanding request
    pub async fn acquire(&self) -> Result<ResolvedLocation, AcquireError> {
        let (my_generation, mut newer) = {
            let mut state = self.state.write().await;
            self.generation.send_modify(|g| *g += 1);
            *state = LocationState::Acquiring;
            (*self.generation.borrow(), self.generation.subscribe())
        };

        let superseded = async move {
            if newer.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        };

        let outcome = tokio::select! {
            outcome = self.locate() => outcome,
            _ = superseded => {
                debug!("Location request {} superseded", my_generation);
                return Err(AcquireError::Superseded);
            }
        };

        let mut state = self.state.write().await;
        if *self.generation.borrow() != my_generation {
            return Err(AcquireError::Superseded);
        }

        match outcome {
            Ok(location) => {
                *state = LocationState::Resolved(location.clone());
                Ok(location)
            }
            Err(failure) => {
                debug!("Location unavailable: {}", failure);
                *state = LocationState::Unavailable(failure);
                Err(AcquireError::Failure(failure))
            }
        }
    }

    /// Reset to idle and try again
    pub async fn retry(&self) -> Result<ResolvedLocation, AcquireError> {
        *self.state.write().await = LocationState::Idle;
        self.acquire().await
    }

    /// Use an operator or reporter supplied address at coordinates (0, 0)
    pub async fn manual(&self, address: &str) -> ResolvedLocation {
        let location = ResolvedLocation::manual(address);
        let mut state = self.state.write().await;
        self.generation.send_modify(|g| *g += 1);
        *state = LocationState::Resolved(location.clone());
        location
    }

    async fn locate(&self) -> Result<ResolvedLocation, LocationFailure> {
        let fix = tokio::time::timeout(
            self.options.timeout,
            self.device.current_position(&self.options),
        )
        .await
        .map_err(|_| LocationFailure::Timeout)??;

        let address = self.reverse_resolve(fix).await;

        Ok(ResolvedLocation {
            coordinates: fix,
            address,
            source: LocationSource::Device,
        })
    }

    async fn reverse_resolve(&self, fix: Coordinates) -> String {
        match self
            .geocoder
            .reverse_resolve(fix.latitude, fix.longitude)
            .await
        {
            Ok(Some(address)) if !address.trim().is_empty() => address,
            Ok(_) => ADDRESS_PLACEHOLDER.to_string(),
            Err(e) => {
                warn!(
                    "Reverse geocoding failed for {},{}: {}",
                    fix.latitude, fix.longitude, e
                );
                ADDRESS_PLACEHOLDER.to_string()
            }
        }
    }
}
