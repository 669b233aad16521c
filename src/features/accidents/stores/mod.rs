mod memory_report_store;
mod pg_report_store;

use async_trait::async_trait;
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::accidents::models::{AccidentReport, ReportFilter, ReportStatus, Transition};

pub use memory_report_store::InMemoryReportStore;
pub use pg_report_store::PgReportStore;

/// Result of a compare-and-swap status update
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionOutcome {
    Applied(AccidentReport),
    NotFound,
    /// The report was no longer in the expected status
    Conflict(ReportStatus),
}

#[async_trait]
pub trait ReportStore: Send + Sync {
    async fn save(&self, report: &AccidentReport) -> Result<()>;

    async fn get(&self, id: Uuid) -> Result<Option<AccidentReport>>;

    /// Apply `transition` only if the report is still in `transition.from`
    async fn transition(&self, id: Uuid, transition: &Transition) -> Result<TransitionOutcome>;

    /// Matching reports, newest first
    async fn list(&self, filter: &ReportFilter) -> Result<Vec<AccidentReport>>;
}
