use minijinja::context;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::ReportService;
use crate::core::error::{AppError, Result};
use crate::features::accidents::dtos::DispatchOutcomeDto;
use crate::features::accidents::models::{AccidentReport, AssignedProvider, StatusEvent};
use crate::features::tow_providers::{ProviderDirectory, TowProvider};
use crate::modules::messaging::DeepLinkTransport;
use crate::shared::constants::ADDRESS_PLACEHOLDER;
use crate::shared::templates::{render_template, PROVIDER_DISPATCH};

/// Google Maps link for known coordinates
pub fn map_url(report: &AccidentReport) -> Option<String> {
    let coordinates = report.location.coordinates();
    if coordinates.is_origin() {
        return None;
    }
    Some(format!(
        "https://www.google.com/maps?q={},{}",
        coordinates.latitude, coordinates.longitude
    ))
}

/// Address as it should appear in messages
pub fn display_address(report: &AccidentReport) -> &str {
    let address = report.location.address.trim();
    if address.is_empty() {
        ADDRESS_PLACEHOLDER
    } else {
        address
    }
}

/// Assigns tow providers to pending reports
pub struct DispatchService {
    reports: Arc<ReportService>,
    directory: Arc<dyn ProviderDirectory>,
    transport: Arc<dyn DeepLinkTransport>,
}

impl DispatchService {
    pub fn new(
        reports: Arc<ReportService>,
        directory: Arc<dyn ProviderDirectory>,
        transport: Arc<dyn DeepLinkTransport>,
    ) -> Self {
        Self {
            reports,
            directory,
            transport,
        }
    }

    pub fn list_providers(&self) -> Vec<TowProvider> {
        self.directory.providers()
    }

    /// Assign `provider_name` to a pending report and build the provider's
    /// dispatch link. Nothing is changed if any step before the status
    /// update fails.
    pub async fn assign(&self, report_id: Uuid, provider_name: &str) -> Result<DispatchOutcomeDto> {
        let report = self.reports.get(report_id).await?;

        let provider = self.directory.find(provider_name).ok_or_else(|| {
            AppError::NotFound(format!("Tow provider '{}' not found", provider_name.trim()))
        })?;

        // Fail fast on a finished report before composing anything
        let event = StatusEvent::Assign(AssignedProvider {
            name: provider.name.clone(),
            contact_address: provider.notification_address.clone(),
        });
        report.status.apply(&event)?;

        let message = render_template(
            PROVIDER_DISPATCH,
            context! {
                reference => report.reference(),
                vehicle => report.vehicle.display_name(),
                address => display_address(&report),
                map_url => map_url(&report),
            },
        )?;
        let wa_link = self
            .transport
            .build_link(&provider.notification_address, &message)?;

        let updated = self.reports.transition_from(&report, event).await?;

        info!("Dispatched {} to accident report {}", provider.name, report_id);

        Ok(DispatchOutcomeDto {
            report: updated,
            wa_link,
        })
    }
}
