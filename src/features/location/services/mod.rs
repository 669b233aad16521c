mod device;
mod location_resolver;
mod location_service;

pub use device::{DeviceGeolocation, ReportedPosition};
pub use location_resolver::LocationResolver;
pub use location_service::LocationService;
