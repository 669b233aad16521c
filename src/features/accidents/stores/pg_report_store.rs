use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{ReportStore, TransitionOutcome};
use crate::core::error::{AppError, Result};
use crate::features::accidents::models::{
    AccidentReport, AccidentReportRow, ReportFilter, ReportStatus, Transition,
};

const REPORT_COLUMNS: &str = "id, link_id, reporter_name, reporter_phone, vehicle_make, \
     vehicle_model, description, insurance_company, latitude, longitude, address, \
     location_source, registration_image, scene_images, status, provider_name, \
     provider_contact, assigned_at, completed_at, created_at, updated_at";

pub struct PgReportStore {
    pool: PgPool,
}

impl PgReportStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Escape LIKE wildcards in user input and wrap it for a substring match
fn like_pattern(search: &str) -> String {
    let escaped = search
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[async_trait]
impl ReportStore for PgReportStore {
    async fn save(&self, report: &AccidentReport) -> Result<()> {
        let (provider_name, provider_contact) = match &report.assigned_provider {
            Some(p) => (Some(p.name.clone()), Some(p.contact_address.clone())),
            None => (None, None),
        };

        sqlx::query(
            r#"
            INSERT INTO accident_reports (
                id, link_id, reporter_name, reporter_phone, vehicle_make, vehicle_model,
                description, insurance_company, latitude, longitude, address, location_source,
                registration_image, scene_images, status, provider_name, provider_contact,
                assigned_at, completed_at, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20, $21)
            "#,
        )
        .bind(report.id)
        .bind(report.link_id)
        .bind(&report.reporter.name)
        .bind(&report.reporter.phone)
        .bind(&report.vehicle.make)
        .bind(&report.vehicle.model)
        .bind(&report.description)
        .bind(&report.insurance_company)
        .bind(report.location.latitude)
        .bind(report.location.longitude)
        .bind(&report.location.address)
        .bind(report.location.source)
        .bind(&report.attachments.registration_image)
        .bind(&report.attachments.scene_images)
        .bind(report.status)
        .bind(provider_name)
        .bind(provider_contact)
        .bind(report.assigned_at)
        .bind(report.completed_at)
        .bind(report.created_at)
        .bind(report.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert accident report: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<AccidentReport>> {
        let sql = format!("SELECT {} FROM accident_reports WHERE id = $1", REPORT_COLUMNS);

        let row = sqlx::query_as::<_, AccidentReportRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get accident report: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(row.map(AccidentReport::from))
    }

    async fn transition(&self, id: Uuid, transition: &Transition) -> Result<TransitionOutcome> {
        let (provider_name, provider_contact) = match &transition.provider {
            Some(p) => (Some(p.name.clone()), Some(p.contact_address.clone())),
            None => (None, None),
        };

        let sql = format!(
            r#"
            UPDATE accident_reports
            SET status = $3,
                provider_name = COALESCE($4, provider_name),
                provider_contact = COALESCE($5, provider_contact),
                assigned_at = CASE WHEN $3 = 'assigned'::accident_status THEN $6 ELSE assigned_at END,
                completed_at = CASE WHEN $3 = 'completed'::accident_status THEN $6 ELSE completed_at END,
                updated_at = $6
            WHERE id = $1 AND status = $2
            RETURNING {}
            "#,
            REPORT_COLUMNS
        );

        let updated = sqlx::query_as::<_, AccidentReportRow>(&sql)
            .bind(id)
            .bind(transition.from)
            .bind(transition.to)
            .bind(provider_name)
            .bind(provider_contact)
            .bind(transition.at)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to transition accident report: {:?}", e);
                AppError::Database(e)
            })?;

        if let Some(row) = updated {
            return Ok(TransitionOutcome::Applied(row.into()));
        }

        let current: Option<ReportStatus> =
            sqlx::query_scalar("SELECT status FROM accident_reports WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to read accident report status: {:?}", e);
                    AppError::Database(e)
                })?;

        Ok(match current {
            Some(status) => TransitionOutcome::Conflict(status),
            None => TransitionOutcome::NotFound,
        })
    }

    async fn list(&self, filter: &ReportFilter) -> Result<Vec<AccidentReport>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM accident_reports
            WHERE ($1::text IS NULL
                   OR reporter_name ILIKE $1
                   OR reporter_phone ILIKE $1
                   OR vehicle_make ILIKE $1
                   OR vehicle_model ILIKE $1
                   OR address ILIKE $1)
              AND ($2::accident_status IS NULL OR status = $2)
            ORDER BY created_at DESC, id DESC
            "#,
            REPORT_COLUMNS
        );

        let rows = sqlx::query_as::<_, AccidentReportRow>(&sql)
            .bind(filter.search.as_deref().map(like_pattern))
            .bind(filter.status)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list accident reports: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(rows.into_iter().map(AccidentReport::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("corolla"), "%corolla%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }
}
