//! Location acquisition for accident reports.
//!
//! A position fix is requested from a [`DeviceGeolocation`] and then turned
//! into an address by a [`Geocoder`](crate::modules::geocoding::Geocoder).
//! Failing to find an address never blocks a report; failing to get a fix
//! leaves the reporter with retry and manual entry.
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | POST | `/api/accident-form/location` | Resolve a client-reported fix or failure |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use models::{Coordinates, LocationFailure, LocationSource, ResolvedLocation};
pub use services::{DeviceGeolocation, LocationResolver, LocationService, ReportedPosition};
