use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ReportStore, TransitionOutcome};
use crate::core::error::{AppError, Result};
use crate::features::accidents::models::{AccidentReport, ReportFilter, Transition};

/// Process-local report store for development and tests
#[derive(Default)]
pub struct InMemoryReportStore {
    reports: RwLock<HashMap<Uuid, AccidentReport>>,
}

impl InMemoryReportStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReportStore for InMemoryReportStore {
    async fn save(&self, report: &AccidentReport) -> Result<()> {
        let mut reports = self.reports.write().await;
        if reports.contains_key(&report.id) {
            return Err(AppError::Internal(format!(
                "Accident report {} already exists",
                report.id
            )));
        }
        reports.insert(report.id, report.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<AccidentReport>> {
        Ok(self.reports.read().await.get(&id).cloned())
    }

    async fn transition(&self, id: Uuid, transition: &Transition) -> Result<TransitionOutcome> {
        let mut reports = self.reports.write().await;
        let Some(report) = reports.get_mut(&id) else {
            return Ok(TransitionOutcome::NotFound);
        };

        if report.status != transition.from {
            return Ok(TransitionOutcome::Conflict(report.status));
        }

        report.apply_transition(transition);
        Ok(TransitionOutcome::Applied(report.clone()))
    }

    async fn list(&self, filter: &ReportFilter) -> Result<Vec<AccidentReport>> {
        let mut matching: Vec<AccidentReport> = self
            .reports
            .read()
            .await
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();

        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(matching)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::accidents::models::{AssignedProvider, ReportStatus, StatusEvent};
    use crate::shared::test_helpers::sample_report;
    use chrono::{Duration, Utc};
    use std::sync::Arc;

    fn assign(name: &str) -> Transition {
        Transition::plan(
            ReportStatus::Pending,
            StatusEvent::Assign(AssignedProvider {
                name: name.to_string(),
                contact_address: "+27698053809".to_string(),
            }),
            Utc::now(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_transition_is_compare_and_swap() {
        let store = InMemoryReportStore::new();
        let report = sample_report();
        store.save(&report).await.unwrap();

        let first = store.transition(report.id, &assign("Speedy Tow")).await.unwrap();
        assert!(matches!(first, TransitionOutcome::Applied(ref r) if r.status == ReportStatus::Assigned));

        let second = store.transition(report.id, &assign("Rapid Tow Co")).await.unwrap();
        assert_eq!(second, TransitionOutcome::Conflict(ReportStatus::Assigned));

        let stored = store.get(report.id).await.unwrap().unwrap();
        assert_eq!(stored.assigned_provider.unwrap().name, "Speedy Tow");

        let missing = store.transition(Uuid::now_v7(), &assign("Speedy Tow")).await.unwrap();
        assert_eq!(missing, TransitionOutcome::NotFound);
    }

    #[tokio::test]
    async fn test_concurrent_assign_has_single_winner() {
        let store = Arc::new(InMemoryReportStore::new());
        let report = sample_report();
        store.save(&report).await.unwrap();
        let id = report.id;

        let attempts = ["QuickTow Services", "Speedy Tow", "Rapid Tow Co", "Eugene Towing"]
            .into_iter()
            .map(|name| {
                let store = store.clone();
                let transition = assign(name);
                tokio::spawn(async move { store.transition(id, &transition).await })
            });

        let applied = futures::future::join_all(attempts)
            .await
            .into_iter()
            .filter(|r| matches!(r, Ok(Ok(TransitionOutcome::Applied(_)))))
            .count();
        assert_eq!(applied, 1);
    }

    #[tokio::test]
    async fn test_list_newest_first_with_filter() {
        let store = InMemoryReportStore::new();

        let mut older = sample_report();
        older.created_at = Utc::now() - Duration::minutes(5);
        older.vehicle.make = "Nissan".to_string();
        let newer = sample_report();

        store.save(&older).await.unwrap();
        store.save(&newer).await.unwrap();

        let all = store.list(&ReportFilter::default()).await.unwrap();
        assert_eq!(all.iter().map(|r| r.id).collect::<Vec<_>>(), vec![newer.id, older.id]);

        let nissan = store
            .list(&ReportFilter::new(Some("nissan".to_string()), None))
            .await
            .unwrap();
        assert_eq!(nissan.len(), 1);
        assert_eq!(nissan[0].id, older.id);
    }

    #[tokio::test]
    async fn test_duplicate_save_is_rejected() {
        let store = InMemoryReportStore::new();
        let report = sample_report();
        store.save(&report).await.unwrap();
        assert!(store.save(&report).await.is_err());
    }
}
