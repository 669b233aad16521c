mod client_notifier;
mod dispatch_service;
mod intake_service;
mod report_service;

pub use client_notifier::ClientNotifier;
pub use dispatch_service::DispatchService;
pub use intake_service::{select_attachments, IntakeService, SelectedAttachments};
pub use report_service::ReportService;
