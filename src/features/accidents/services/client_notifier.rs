use minijinja::context;
use std::sync::Arc;
use uuid::Uuid;

use super::dispatch_service::display_address;
use super::ReportService;
use crate::core::error::{AppError, Result};
use crate::features::accidents::dtos::NotifyClientDto;
use crate::features::accidents::models::ReportStatus;
use crate::modules::messaging::DeepLinkTransport;
use crate::shared::templates::{render_template, CLIENT_ASSIGNED};

/// Builds the link that tells a reporter which provider is on the way
pub struct ClientNotifier {
    reports: Arc<ReportService>,
    transport: Arc<dyn DeepLinkTransport>,
}

impl ClientNotifier {
    pub fn new(reports: Arc<ReportService>, transport: Arc<dyn DeepLinkTransport>) -> Self {
        Self { reports, transport }
    }

    pub async fn notify_client(&self, report_id: Uuid) -> Result<NotifyClientDto> {
        let report = self.reports.get(report_id).await?;

        let provider = match (&report.status, &report.assigned_provider) {
            (ReportStatus::Assigned, Some(provider)) => provider,
            (ReportStatus::Assigned, None) | (ReportStatus::Pending, _) => {
                return Err(AppError::PreconditionFailed(format!(
                    "Accident report {} has no assigned tow provider",
                    report_id
                )))
            }
            (ReportStatus::Completed, _) => {
                return Err(AppError::PreconditionFailed(format!(
                    "Accident report {} is already completed",
                    report_id
                )))
            }
        };

        let message = render_template(
            CLIENT_ASSIGNED,
            context! {
                name => &report.reporter.name,
                provider => &provider.name,
                address => display_address(&report),
            },
        )?;

        let wa_link = self.transport.build_link(&report.reporter.phone, &message)?;

        Ok(NotifyClientDto { wa_link })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::accidents::models::{AssignedProvider, StatusEvent};
    use crate::features::accidents::stores::InMemoryReportStore;
    use crate::modules::messaging::WhatsAppLinks;
    use crate::shared::test_helpers::sample_report;

    async fn setup(phone: &str) -> (ClientNotifier, Arc<ReportService>, Uuid) {
        let reports = Arc::new(ReportService::new(Arc::new(InMemoryReportStore::new())));
        let mut report = sample_report();
        report.reporter.phone = phone.to_string();
        reports.save(&report).await.unwrap();

        let notifier = ClientNotifier::new(reports.clone(), Arc::new(WhatsAppLinks::default()));
        (notifier, reports, report.id)
    }

    fn assign() -> StatusEvent {
        StatusEvent::Assign(AssignedProvider {
            name: "QuickTow Services".to_string(),
            contact_address: "+27698053809".to_string(),
        })
    }

    #[tokio::test]
    async fn test_pending_report_has_no_provider() {
        let (notifier, _, id) = setup("+27821234567").await;
        let err = notifier.notify_client(id).await.unwrap_err();
        assert!(matches!(err, AppError::PreconditionFailed(_)));
    }

    #[tokio::test]
    async fn test_link_uses_digits_only_phone() {
        let (notifier, reports, id) = setup("071 234 5678").await;
        reports.transition(id, assign()).await.unwrap();

        let dto = notifier.notify_client(id).await.unwrap();
        assert!(dto.wa_link.starts_with("https://wa.me/0712345678?text="));
        assert!(dto.wa_link.contains("QuickTow%20Services"));
    }

    #[tokio::test]
    async fn test_completed_report_is_rejected() {
        let (notifier, reports, id) = setup("+27821234567").await;
        reports.transition(id, assign()).await.unwrap();
        reports.mark_completed(id).await.unwrap();

        let err = notifier.notify_client(id).await.unwrap_err();
        assert!(matches!(err, AppError::PreconditionFailed(_)));
    }

    #[tokio::test]
    async fn test_missing_report() {
        let (notifier, _, _) = setup("+27821234567").await;
        let err = notifier.notify_client(Uuid::now_v7()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
