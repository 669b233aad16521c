#![cfg(test)]

use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::core::app::{AppServices, Collaborators, ServiceSettings};
use crate::core::error::{AppError, Result};
use crate::features::accident_links::dtos::CreateAccidentLinkDto;
use crate::features::accident_links::{InMemoryLinkTokenStore, LinkTokenService};
use crate::features::accidents::dtos::{AttachmentKind, AttachmentUpload, SubmitAccidentReportDto};
use crate::features::accidents::models::{
    AccidentLocation, AccidentReport, Attachments, ReportStatus, Reporter, Vehicle,
};
use crate::features::accidents::InMemoryReportStore;
use crate::features::location::models::{
    Coordinates, LocationFailure, LocationSource, PositionOptions,
};
use crate::features::location::DeviceGeolocation;
use crate::features::tow_providers::StaticProviderDirectory;
use crate::modules::geocoding::Geocoder;
use crate::modules::messaging::{PhoneRule, WhatsAppLinks};
use crate::modules::storage::{BlobStorage, InMemoryBlobStorage};

pub const TEST_FRONTEND_URL: &str = "https://ais.example.com";

pub fn south_africa() -> PhoneRule {
    PhoneRule::new(Some("27".to_string()), 9)
}

/// Link service over an in-memory store with a 24h TTL
pub fn test_link_service() -> LinkTokenService {
    LinkTokenService::new(
        Arc::new(InMemoryLinkTokenStore::new()),
        Arc::new(WhatsAppLinks::default()),
        south_africa(),
        TEST_FRONTEND_URL,
        Duration::from_secs(24 * 60 * 60),
    )
}

pub fn link_dto(name: &str, phone: &str) -> CreateAccidentLinkDto {
    CreateAccidentLinkDto {
        name: name.to_string(),
        email: None,
        phone: phone.to_string(),
    }
}

pub async fn issue_test_token(links: &Arc<LinkTokenService>) -> String {
    links
        .issue(link_dto("Thandi Mokoena", "+27821234567"))
        .await
        .unwrap()
        .token
}

pub fn sample_report() -> AccidentReport {
    let now = Utc::now();
    AccidentReport {
        id: Uuid::now_v7(),
        link_id: Some(Uuid::new_v4()),
        reporter: Reporter {
            name: "Thandi Mokoena".to_string(),
            phone: "+27821234567".to_string(),
        },
        vehicle: Vehicle {
            make: "Toyota".to_string(),
            model: "Corolla".to_string(),
        },
        description: Some("Rear-ended at the traffic lights".to_string()),
        insurance_company: None,
        location: AccidentLocation {
            latitude: -33.92,
            longitude: 18.42,
            address: "N1, Cape Town".to_string(),
            source: LocationSource::Device,
        },
        attachments: Attachments {
            registration_image: None,
            scene_images: vec![],
        },
        status: ReportStatus::Pending,
        assigned_provider: None,
        assigned_at: None,
        completed_at: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn submit_dto() -> SubmitAccidentReportDto {
    SubmitAccidentReportDto {
        reporter_name: "Thandi Mokoena".to_string(),
        reporter_phone: "+27821234567".to_string(),
        vehicle_make: "Toyota".to_string(),
        vehicle_model: "Corolla".to_string(),
        latitude: Some(-33.92),
        longitude: Some(18.42),
        address: Some("N1, Cape Town".to_string()),
        location_source: Some(LocationSource::Device),
        ..Default::default()
    }
}

pub fn image(kind: AttachmentKind, name: &str) -> AttachmentUpload {
    AttachmentUpload {
        kind,
        file_name: Some(name.to_string()),
        content_type: "image/jpeg".to_string(),
        data: vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10],
    }
}

/// Services wired over in-memory collaborators
pub fn test_services(geocoder: Arc<dyn Geocoder>) -> AppServices {
    AppServices::new(
        Collaborators {
            link_store: Arc::new(InMemoryLinkTokenStore::new()),
            report_store: Arc::new(InMemoryReportStore::new()),
            storage: Arc::new(InMemoryBlobStorage::new()),
            geocoder,
            directory: Arc::new(StaticProviderDirectory::default()),
            transport: Arc::new(WhatsAppLinks::default()),
        },
        ServiceSettings {
            phone_rule: south_africa(),
            frontend_url: TEST_FRONTEND_URL.to_string(),
            link_ttl: Duration::from_secs(24 * 60 * 60),
            position_options: PositionOptions::default(),
        },
    )
}

/// Geocoder that always answers with the same address
pub struct StaticGeocoder {
    address: Option<String>,
}

impl StaticGeocoder {
    pub fn new(address: Option<&str>) -> Self {
        Self {
            address: address.map(str::to_string),
        }
    }
}

#[async_trait]
impl Geocoder for StaticGeocoder {
    async fn reverse_resolve(&self, _latitude: f64, _longitude: f64) -> Result<Option<String>> {
        Ok(self.address.clone())
    }
}

pub struct FailingGeocoder;

#[async_trait]
impl Geocoder for FailingGeocoder {
    async fn reverse_resolve(&self, _latitude: f64, _longitude: f64) -> Result<Option<String>> {
        Err(AppError::TransportFailure("geocoder offline".to_string()))
    }
}

/// Device whose first fix takes `delay`; later fixes are immediate
pub struct SlowFirstDevice {
    delay: Duration,
    calls: AtomicUsize,
}

impl SlowFirstDevice {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl DeviceGeolocation for SlowFirstDevice {
    async fn current_position(
        &self,
        _options: &PositionOptions,
    ) -> std::result::Result<Coordinates, LocationFailure> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            tokio::time::sleep(self.delay).await;
        }
        Ok(Coordinates::new(-34.07, 18.85))
    }
}

pub struct FailingBlobStorage;

#[async_trait]
impl BlobStorage for FailingBlobStorage {
    async fn store(&self, path: &str, _data: Vec<u8>, _content_type: &str) -> Result<String> {
        Err(AppError::TransportFailure(format!(
            "storage unavailable for '{}'",
            path
        )))
    }
}
