use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use utoipa::ToSchema;

use crate::core::error::AppError;

/// Lifecycle of an accident report. Only ever moves forward:
/// `pending -> assigned -> completed`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, sqlx::Type,
)]
#[sqlx(type_name = "accident_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Pending,
    Assigned,
    Completed,
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReportStatus::Pending => "pending",
            ReportStatus::Assigned => "assigned",
            ReportStatus::Completed => "completed",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignedProvider {
    pub name: String,
    pub contact_address: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusEvent {
    Assign(AssignedProvider),
    Complete,
}

impl StatusEvent {
    pub fn name(&self) -> &'static str {
        match self {
            StatusEvent::Assign(_) => "assign",
            StatusEvent::Complete => "complete",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot {event} a report that is {from}")]
pub struct TransitionError {
    pub from: ReportStatus,
    pub event: &'static str,
}

impl From<TransitionError> for AppError {
    fn from(err: TransitionError) -> Self {
        AppError::InvalidStateTransition(err.to_string())
    }
}

impl ReportStatus {
    /// The single place that decides which transitions are legal
    pub fn apply(self, event: &StatusEvent) -> Result<ReportStatus, TransitionError> {
        match (self, event) {
            (ReportStatus::Pending, StatusEvent::Assign(_)) => Ok(ReportStatus::Assigned),
            (ReportStatus::Assigned, StatusEvent::Complete) => Ok(ReportStatus::Completed),
            (from, event) => Err(TransitionError {
                from,
                event: event.name(),
            }),
        }
    }
}

/// A validated status change, applied by stores as compare-and-swap on `from`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub from: ReportStatus,
    pub to: ReportStatus,
    pub provider: Option<AssignedProvider>,
    pub at: DateTime<Utc>,
}

impl Transition {
    pub fn plan(
        from: ReportStatus,
        event: StatusEvent,
        at: DateTime<Utc>,
    ) -> Result<Self, TransitionError> {
        let to = from.apply(&event)?;
        let provider = match event {
            StatusEvent::Assign(provider) => Some(provider),
            StatusEvent::Complete => None,
        };

        Ok(Self {
            from,
            to,
            provider,
            at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assign() -> StatusEvent {
        StatusEvent::Assign(AssignedProvider {
            name: "QuickTow Services".to_string(),
            contact_address: "+27698053809".to_string(),
        })
    }

    #[test]
    fn test_forward_transitions() {
        assert_eq!(ReportStatus::Pending.apply(&assign()), Ok(ReportStatus::Assigned));
        assert_eq!(
            ReportStatus::Assigned.apply(&StatusEvent::Complete),
            Ok(ReportStatus::Completed)
        );
    }

    #[test]
    fn test_every_other_pair_is_rejected() {
        let rejected = [
            (ReportStatus::Pending, StatusEvent::Complete),
            (ReportStatus::Assigned, assign()),
            (ReportStatus::Completed, assign()),
            (ReportStatus::Completed, StatusEvent::Complete),
        ];

        for (from, event) in rejected {
            let err = from.apply(&event).unwrap_err();
            assert_eq!(err.from, from);
        }
    }

    #[test]
    fn test_no_sequence_moves_backwards() {
        let events = [assign(), StatusEvent::Complete, assign(), StatusEvent::Complete];
        let order = |s: ReportStatus| match s {
            ReportStatus::Pending => 0,
            ReportStatus::Assigned => 1,
            ReportStatus::Completed => 2,
        };

        let mut status = ReportStatus::Pending;
        for event in events.iter().cycle().take(12) {
            if let Ok(next) = status.apply(event) {
                assert_eq!(order(next), order(status) + 1);
                status = next;
            }
        }
        assert_eq!(status, ReportStatus::Completed);
    }

    #[test]
    fn test_plan_carries_provider_only_on_assign() {
        let at = Utc::now();
        let assign = Transition::plan(ReportStatus::Pending, assign(), at).unwrap();
        assert_eq!(assign.to, ReportStatus::Assigned);
        assert_eq!(assign.provider.unwrap().name, "QuickTow Services");

        let complete = Transition::plan(ReportStatus::Assigned, StatusEvent::Complete, at).unwrap();
        assert!(complete.provider.is_none());
    }

    #[test]
    fn test_transition_error_maps_to_conflict() {
        let err: AppError = ReportStatus::Completed.apply(&assign()).unwrap_err().into();
        assert!(matches!(err, AppError::InvalidStateTransition(ref m) if m == "cannot assign a report that is completed"));
    }
}
