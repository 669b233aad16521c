//! Modules layer - Infrastructure components for external integrations
//!
//! Contains clients and adapters for object storage, reverse geocoding and
//! deep-link messaging.

pub mod geocoding;
pub mod messaging;
pub mod storage;
