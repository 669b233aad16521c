//! Reverse geocoding adapters
//!
//! Turns a coordinate fix into a human-readable address. An address that
//! cannot be resolved is `Ok(None)`; transport problems are errors, and the
//! caller decides whether either one matters.

mod google;
mod nominatim;

use async_trait::async_trait;

use crate::core::error::Result;

pub use google::GoogleGeocoder;
pub use nominatim::NominatimGeocoder;

#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn reverse_resolve(&self, latitude: f64, longitude: f64) -> Result<Option<String>>;
}
