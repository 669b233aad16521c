use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::status::{AssignedProvider, ReportStatus, Transition};
use crate::features::location::{Coordinates, LocationSource};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Reporter {
    pub name: String,
    /// Notification address for the client
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Vehicle {
    pub make: String,
    pub model: String,
}

impl Vehicle {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.make, self.model)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AccidentLocation {
    pub latitude: f64,
    pub longitude: f64,
    /// May be empty
    pub address: String,
    pub source: LocationSource,
}

impl AccidentLocation {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Attachments {
    pub registration_image: Option<String>,
    pub scene_images: Vec<String>,
}

/// An accident report as the rest of the system sees it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccidentReport {
    pub id: Uuid,
    /// Link the submission was gated by
    pub link_id: Option<Uuid>,
    pub reporter: Reporter,
    pub vehicle: Vehicle,
    pub description: Option<String>,
    pub insurance_company: Option<String>,
    pub location: AccidentLocation,
    pub attachments: Attachments,
    pub status: ReportStatus,
    pub assigned_provider: Option<AssignedProvider>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AccidentReport {
    /// Short reference quoted in messages ("AIS-1A2B3C4D")
    pub fn reference(&self) -> String {
        let simple = self.id.simple().to_string();
        format!("AIS-{}", &simple[simple.len() - 8..]).to_uppercase()
    }

    /// Apply a transition that a store has already matched against `status`
    pub fn apply_transition(&mut self, transition: &Transition) {
        self.status = transition.to;
        if let Some(provider) = &transition.provider {
            self.assigned_provider = Some(provider.clone());
            self.assigned_at = Some(transition.at);
        }
        if transition.to == ReportStatus::Completed {
            self.completed_at = Some(transition.at);
        }
        self.updated_at = transition.at;
    }
}

/// Flat database row for `accident_reports`
#[derive(Debug, Clone, FromRow)]
pub struct AccidentReportRow {
    pub id: Uuid,
    pub link_id: Option<Uuid>,
    pub reporter_name: String,
    pub reporter_phone: String,
    pub vehicle_make: String,
    pub vehicle_model: String,
    pub description: Option<String>,
    pub insurance_company: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
    pub location_source: LocationSource,
    pub registration_image: Option<String>,
    pub scene_images: Vec<String>,
    pub status: ReportStatus,
    pub provider_name: Option<String>,
    pub provider_contact: Option<String>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<AccidentReportRow> for AccidentReport {
    fn from(row: AccidentReportRow) -> Self {
        let assigned_provider = match (row.provider_name, row.provider_contact) {
            (Some(name), Some(contact_address)) => Some(AssignedProvider {
                name,
                contact_address,
            }),
            _ => None,
        };

        Self {
            id: row.id,
            link_id: row.link_id,
            reporter: Reporter {
                name: row.reporter_name,
                phone: row.reporter_phone,
            },
            vehicle: Vehicle {
                make: row.vehicle_make,
                model: row.vehicle_model,
            },
            description: row.description,
            insurance_company: row.insurance_company,
            location: AccidentLocation {
                latitude: row.latitude,
                longitude: row.longitude,
                address: row.address,
                source: row.location_source,
            },
            attachments: Attachments {
                registration_image: row.registration_image,
                scene_images: row.scene_images,
            },
            status: row.status,
            assigned_provider,
            assigned_at: row.assigned_at,
            completed_at: row.completed_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Search and status filter for the operator list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportFilter {
    pub search: Option<String>,
    pub status: Option<ReportStatus>,
}

impl ReportFilter {
    pub fn new(search: Option<String>, status: Option<ReportStatus>) -> Self {
        Self {
            search: search
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            status,
        }
    }

    /// Case-insensitive substring match over reporter, phone, vehicle and address
    pub fn matches(&self, report: &AccidentReport) -> bool {
        if let Some(status) = self.status {
            if report.status != status {
                return false;
            }
        }

        let Some(search) = &self.search else {
            return true;
        };
        let needle = search.to_lowercase();

        [
            &report.reporter.name,
            &report.reporter.phone,
            &report.vehicle.make,
            &report.vehicle.model,
            &report.location.address,
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
    }
}
