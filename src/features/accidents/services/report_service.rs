use chrono::Utc;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::accidents::models::{
    AccidentReport, ReportFilter, StatusEvent, Transition,
};
use crate::features::accidents::stores::{ReportStore, TransitionOutcome};

/// Reads reports and drives every status change through the state machine
pub struct ReportService {
    store: Arc<dyn ReportStore>,
}

impl ReportService {
    pub fn new(store: Arc<dyn ReportStore>) -> Self {
        Self { store }
    }

    pub async fn get(&self, id: Uuid) -> Result<AccidentReport> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Accident report {} not found", id)))
    }

    pub async fn list(&self, filter: &ReportFilter) -> Result<Vec<AccidentReport>> {
        self.store.list(filter).await
    }

    pub async fn save(&self, report: &AccidentReport) -> Result<()> {
        self.store.save(report).await
    }

    /// Apply `event` to a report loaded by the caller.
    ///
    /// The store only applies the change if the report is still in the status
    /// the caller saw, so two racing operators cannot both win.
    pub async fn transition_from(
        &self,
        report: &AccidentReport,
        event: StatusEvent,
    ) -> Result<AccidentReport> {
        let transition = Transition::plan(report.status, event, Utc::now())?;

        match self.store.transition(report.id, &transition).await? {
            TransitionOutcome::Applied(updated) => {
                info!(
                    "Accident report {} moved {} -> {}",
                    report.id, transition.from, transition.to
                );
                Ok(updated)
            }
            TransitionOutcome::NotFound => Err(AppError::NotFound(format!(
                "Accident report {} not found",
                report.id
            ))),
            TransitionOutcome::Conflict(current) => Err(AppError::InvalidStateTransition(format!(
                "Accident report {} is already {}",
                report.id, current
            ))),
        }
    }

    pub async fn transition(&self, id: Uuid, event: StatusEvent) -> Result<AccidentReport> {
        let report = self.get(id).await?;
        self.transition_from(&report, event).await
    }

    /// `assigned -> completed`
    pub async fn mark_completed(&self, id: Uuid) -> Result<AccidentReport> {
        self.transition(id, StatusEvent::Complete).await
    }
}
