use chrono::Utc;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;
use validator::Validate;

use super::ReportService;
use crate::core::error::{AppError, Result};
use crate::features::accident_links::LinkTokenService;
use crate::features::accidents::dtos::{
    AttachmentFailure, AttachmentKind, AttachmentUpload, SubmissionOutcomeDto,
    SubmitAccidentReportDto,
};
use crate::features::accidents::models::{
    AccidentLocation, AccidentReport, Attachments, Reporter, ReportStatus, Vehicle,
};
use crate::modules::storage::BlobStorage;
use crate::shared::constants::{
    extension_for_content_type, is_image_type_allowed, MAX_ATTACHMENT_SIZE, MAX_SCENE_IMAGES,
};

/// Attachments kept from a submission, each with its position among
/// attachments of the same kind
#[derive(Debug, Default)]
pub struct SelectedAttachments {
    pub registration: Option<(usize, AttachmentUpload)>,
    pub scenes: Vec<(usize, AttachmentUpload)>,
}

/// Keep the first registration image and the first four scene images, in
/// submission order. Anything beyond that is dropped without error.
pub fn select_attachments(uploads: Vec<AttachmentUpload>) -> SelectedAttachments {
    let mut selected = SelectedAttachments::default();
    let mut registration_count = 0;
    let mut scene_count = 0;

    for upload in uploads {
        match upload.kind {
            AttachmentKind::RegistrationImage => {
                if selected.registration.is_none() {
                    selected.registration = Some((registration_count, upload));
                } else {
                    debug!("Ignoring extra registration image #{}", registration_count);
                }
                registration_count += 1;
            }
            AttachmentKind::SceneImage => {
                if selected.scenes.len() < MAX_SCENE_IMAGES {
                    selected.scenes.push((scene_count, upload));
                } else {
                    debug!("Dropping scene image #{} over the limit", scene_count);
                }
                scene_count += 1;
            }
        }
    }

    selected
}

fn check_attachment(upload: &AttachmentUpload) -> std::result::Result<(), String> {
    if upload.data.is_empty() {
        return Err("File is empty".to_string());
    }
    if upload.data.len() > MAX_ATTACHMENT_SIZE {
        return Err(format!(
            "File too large. Maximum size is {} MB",
            MAX_ATTACHMENT_SIZE / 1024 / 1024
        ));
    }
    if !is_image_type_allowed(&upload.content_type) {
        return Err(format!("File type '{}' is not allowed", upload.content_type));
    }
    Ok(())
}

fn attachment_path(report_id: Uuid, kind: AttachmentKind, index: usize, content_type: &str) -> String {
    let extension = extension_for_content_type(content_type);
    match kind {
        AttachmentKind::RegistrationImage => format!("{}/registration.{}", report_id, extension),
        AttachmentKind::SceneImage => format!("{}/scene-{}.{}", report_id, index + 1, extension),
    }
}

struct StoredAttachment {
    kind: AttachmentKind,
    index: usize,
    file_name: Option<String>,
    outcome: std::result::Result<String, String>,
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Accepts accident forms submitted through a link
pub struct IntakeService {
    links: Arc<LinkTokenService>,
    reports: Arc<ReportService>,
    storage: Arc<dyn BlobStorage>,
}

impl IntakeService {
    pub fn new(
        links: Arc<LinkTokenService>,
        reports: Arc<ReportService>,
        storage: Arc<dyn BlobStorage>,
    ) -> Self {
        Self {
            links,
            reports,
            storage,
        }
    }

    /// Create a `pending` report.
    ///
    /// The token is validated but not consumed. Attachment problems are
    /// reported per attachment and never stop the report from being created.
    pub async fn submit(
        &self,
        token: &str,
        dto: SubmitAccidentReportDto,
        uploads: Vec<AttachmentUpload>,
    ) -> Result<SubmissionOutcomeDto> {
        let identity = self.links.validate(token).await?;

        dto.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        dto.check_coordinates().map_err(AppError::Validation)?;

        let report_id = Uuid::now_v7();
        let selected = select_attachments(uploads);

        let uploads = selected
            .registration
            .into_iter()
            .chain(selected.scenes)
            .map(|(index, upload)| self.store_attachment(report_id, index, upload));
        let stored = join_all(uploads).await;

        let mut attachments = Attachments::default();
        let mut attachment_failures = Vec::new();

        for attachment in stored {
            match (attachment.kind, attachment.outcome) {
                (AttachmentKind::RegistrationImage, Ok(url)) => {
                    attachments.registration_image = Some(url)
                }
                (AttachmentKind::SceneImage, Ok(url)) => attachments.scene_images.push(url),
                (kind, Err(reason)) => attachment_failures.push(AttachmentFailure {
                    kind,
                    index: attachment.index,
                    file_name: attachment.file_name,
                    reason,
                }),
            }
        }

        let source = dto.resolved_location_source();
        let now = Utc::now();
        let report = AccidentReport {
            id: report_id,
            link_id: Some(identity.link_id),
            reporter: Reporter {
                name: dto.reporter_name.trim().to_string(),
                phone: dto.reporter_phone.trim().to_string(),
            },
            vehicle: Vehicle {
                make: dto.vehicle_make.trim().to_string(),
                model: dto.vehicle_model.trim().to_string(),
            },
            description: trimmed(dto.description),
            insurance_company: trimmed(dto.insurance_company),
            location: AccidentLocation {
                latitude: dto.latitude.unwrap_or(0.0),
                longitude: dto.longitude.unwrap_or(0.0),
                address: trimmed(dto.address).unwrap_or_default(),
                source,
            },
            attachments,
            status: ReportStatus::Pending,
            assigned_provider: None,
            assigned_at: None,
            completed_at: None,
            created_at: now,
            updated_at: now,
        };

        self.reports.save(&report).await?;

        info!(
            "Accident report {} submitted via link {} ({} attachment failures)",
            report.id,
            identity.link_id,
            attachment_failures.len()
        );

        Ok(SubmissionOutcomeDto {
            report,
            attachment_failures,
        })
    }

    async fn store_attachment(
        &self,
        report_id: Uuid,
        index: usize,
        upload: AttachmentUpload,
    ) -> StoredAttachment {
        let checked = check_attachment(&upload);
        let AttachmentUpload {
            kind,
            file_name,
            content_type,
            data,
        } = upload;

        let outcome = match checked {
            Err(reason) => Err(reason),
            Ok(()) => {
                let path = attachment_path(report_id, kind, index, &content_type);
                self.storage
                    .store(&path, data, &content_type)
                    .await
                    .map_err(|e| {
                        warn!("Failed to store attachment {}: {}", path, e);
                        "Upload failed".to_string()
                    })
            }
        };

        StoredAttachment {
            kind,
            index,
            file_name,
            outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::accidents::stores::InMemoryReportStore;
    use crate::features::location::{LocationFailure, LocationSource, ResolvedLocation};
    use crate::modules::storage::InMemoryBlobStorage;
    use crate::shared::test_helpers::{
        image, issue_test_token, submit_dto, test_link_service, FailingBlobStorage,
    };

    struct Harness {
        intake: IntakeService,
        reports: Arc<ReportService>,
        storage: Arc<InMemoryBlobStorage>,
        token: String,
    }

    async fn harness() -> Harness {
        let links = Arc::new(test_link_service());
        let token = issue_test_token(&links).await;
        let reports = Arc::new(ReportService::new(Arc::new(InMemoryReportStore::new())));
        let storage = Arc::new(InMemoryBlobStorage::new());
        let intake = IntakeService::new(links, reports.clone(), storage.clone());
        Harness {
            intake,
            reports,
            storage,
            token,
        }
    }

    #[test]
    fn test_select_keeps_first_four_scenes_in_order() {
        let uploads = (0..6)
            .map(|i| image(AttachmentKind::SceneImage, &format!("scene-{}.jpg", i)))
            .collect();

        let selected = select_attachments(uploads);
        let names: Vec<String> = selected
            .scenes
            .iter()
            .map(|(_, u)| u.file_name.clone().unwrap())
            .collect();
        assert_eq!(names, vec!["scene-0.jpg", "scene-1.jpg", "scene-2.jpg", "scene-3.jpg"]);
    }

    #[test]
    fn test_select_keeps_first_registration() {
        let selected = select_attachments(vec![
            image(AttachmentKind::RegistrationImage, "first.jpg"),
            image(AttachmentKind::SceneImage, "scene.jpg"),
            image(AttachmentKind::RegistrationImage, "second.jpg"),
        ]);

        let (index, registration) = selected.registration.unwrap();
        assert_eq!(index, 0);
        assert_eq!(registration.file_name.as_deref(), Some("first.jpg"));
        assert_eq!(selected.scenes.len(), 1);
    }

    #[tokio::test]
    async fn test_submit_creates_pending_report() {
        let h = harness().await;
        let outcome = h.intake.submit(&h.token, submit_dto(), vec![]).await.unwrap();

        assert_eq!(outcome.report.status, ReportStatus::Pending);
        assert!(outcome.report.link_id.is_some());
        assert!(outcome.attachment_failures.is_empty());
        assert_eq!(h.reports.get(outcome.report.id).await.unwrap(), outcome.report);
    }

    #[tokio::test]
    async fn test_submit_does_not_consume_token() {
        let h = harness().await;
        h.intake.submit(&h.token, submit_dto(), vec![]).await.unwrap();
        h.intake.submit(&h.token, submit_dto(), vec![]).await.unwrap();
    }

    #[tokio::test]
    async fn test_submit_rejects_bad_token_before_anything_else() {
        let h = harness().await;
        let err = h
            .intake
            .submit("ffffffffffffffffffffffffffffffff", submit_dto(), vec![image(AttachmentKind::SceneImage, "a.jpg")])
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InvalidToken(_)));
        assert_eq!(h.storage.len().await, 0);
    }

    #[tokio::test]
    async fn test_submit_requires_fields() {
        let h = harness().await;
        let dto = SubmitAccidentReportDto {
            vehicle_make: " ".to_string(),
            ..submit_dto()
        };
        let err = h.intake.submit(&h.token, dto, vec![]).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_submit_rejects_phone_without_digits() {
        let h = harness().await;
        let dto = SubmitAccidentReportDto {
            reporter_phone: "call me".to_string(),
            ..submit_dto()
        };
        let err = h.intake.submit(&h.token, dto, vec![]).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(h.reports.list(&Default::default()).await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_submit_rejects_unusable_coordinates() {
        let h = harness().await;

        let latitude_only = SubmitAccidentReportDto {
            longitude: None,
            ..submit_dto()
        };
        let err = h.intake.submit(&h.token, latitude_only, vec![]).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let not_a_number = SubmitAccidentReportDto {
            latitude: Some(f64::NAN),
            longitude: Some(f64::NAN),
            ..submit_dto()
        };
        let err = h.intake.submit(&h.token, not_a_number, vec![]).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_six_scene_images_keep_first_four() {
        let h = harness().await;
        let uploads = (0..6)
            .map(|i| image(AttachmentKind::SceneImage, &format!("scene-{}.jpg", i)))
            .collect();

        let outcome = h.intake.submit(&h.token, submit_dto(), uploads).await.unwrap();
        let scenes = &outcome.report.attachments.scene_images;

        assert_eq!(scenes.len(), 4);
        for (i, url) in scenes.iter().enumerate() {
            assert!(url.ends_with(&format!("/scene-{}.jpg", i + 1)));
        }
        assert!(outcome.attachment_failures.is_empty());
        assert_eq!(h.storage.len().await, 4);
    }

    #[tokio::test]
    async fn test_bad_attachment_is_reported_not_fatal() {
        let h = harness().await;
        let mut pdf = image(AttachmentKind::SceneImage, "claim.pdf");
        pdf.content_type = "application/pdf".to_string();

        let outcome = h
            .intake
            .submit(
                &h.token,
                submit_dto(),
                vec![image(AttachmentKind::RegistrationImage, "reg.jpg"), pdf],
            )
            .await
            .unwrap();

        assert!(outcome.report.attachments.registration_image.is_some());
        assert!(outcome.report.attachments.scene_images.is_empty());
        assert_eq!(outcome.attachment_failures.len(), 1);
        assert_eq!(outcome.attachment_failures[0].kind, AttachmentKind::SceneImage);
        assert_eq!(outcome.attachment_failures[0].file_name.as_deref(), Some("claim.pdf"));
    }

    #[tokio::test]
    async fn test_storage_outage_still_creates_report() {
        let links = Arc::new(test_link_service());
        let token = issue_test_token(&links).await;
        let reports = Arc::new(ReportService::new(Arc::new(InMemoryReportStore::new())));
        let intake = IntakeService::new(links, reports, Arc::new(FailingBlobStorage));

        let outcome = intake
            .submit(&token, submit_dto(), vec![image(AttachmentKind::RegistrationImage, "reg.jpg")])
            .await
            .unwrap();

        assert!(outcome.report.attachments.registration_image.is_none());
        assert_eq!(outcome.attachment_failures[0].reason, "Upload failed");
    }

    #[tokio::test]
    async fn test_permission_denied_falls_back_to_manual_address() {
        let h = harness().await;

        // The browser refused location access, so the operator typed the address
        let failure = LocationFailure::PermissionDenied;
        assert!(failure.reason().contains("manually"));
        let manual = ResolvedLocation::manual("Off-ramp 42, N2 Eastbound");

        let dto = SubmitAccidentReportDto {
            latitude: Some(manual.coordinates.latitude),
            longitude: Some(manual.coordinates.longitude),
            address: Some(manual.address.clone()),
            ..submit_dto()
        };
        let outcome = h.intake.submit(&h.token, dto, vec![]).await.unwrap();

        let location = &outcome.report.location;
        assert_eq!((location.latitude, location.longitude), (0.0, 0.0));
        assert_eq!(location.address, "Off-ramp 42, N2 Eastbound");
        assert_eq!(location.source, LocationSource::Manual);
        assert_eq!(outcome.report.status, ReportStatus::Pending);
    }
}
