use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::LinkTokenStore;
use crate::core::error::{AppError, Result};
use crate::features::accident_links::models::AccidentLink;

const LINK_COLUMNS: &str = "id, token_hash, client_name, client_email, client_phone, \
                            expires_at, consumed_at, created_at";

pub struct PgLinkTokenStore {
    pool: PgPool,
}

impl PgLinkTokenStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LinkTokenStore for PgLinkTokenStore {
    async fn insert(&self, link: &AccidentLink) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO accident_links
                (id, token_hash, client_name, client_email, client_phone, expires_at, consumed_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(link.id)
        .bind(&link.token_hash)
        .bind(&link.client_name)
        .bind(&link.client_email)
        .bind(&link.client_phone)
        .bind(link.expires_at)
        .bind(link.consumed_at)
        .bind(link.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert accident link: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(())
    }

    async fn find_by_hash(&self, token_hash: &str) -> Result<Option<AccidentLink>> {
        let sql = format!(
            "SELECT {} FROM accident_links WHERE token_hash = $1",
            LINK_COLUMNS
        );

        sqlx::query_as::<_, AccidentLink>(&sql)
            .bind(token_hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to look up accident link: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn consume(&self, token_hash: &str, now: DateTime<Utc>) -> Result<Option<AccidentLink>> {
        let sql = format!(
            r#"
            UPDATE accident_links
            SET consumed_at = $2
            WHERE token_hash = $1 AND consumed_at IS NULL AND expires_at > $2
            RETURNING {}
            "#,
            LINK_COLUMNS
        );

        sqlx::query_as::<_, AccidentLink>(&sql)
            .bind(token_hash)
            .bind(now)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to consume accident link: {:?}", e);
                AppError::Database(e)
            })
    }
}
