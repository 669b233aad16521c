use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::LinkTokenStore;
use crate::core::error::{AppError, Result};
use crate::features::accident_links::models::AccidentLink;

/// Process-local link store for development and tests
#[derive(Default)]
pub struct InMemoryLinkTokenStore {
    links: RwLock<HashMap<String, AccidentLink>>,
}

impl InMemoryLinkTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LinkTokenStore for InMemoryLinkTokenStore {
    async fn insert(&self, link: &AccidentLink) -> Result<()> {
        let mut links = self.links.write().await;
        if links.contains_key(&link.token_hash) {
            return Err(AppError::Internal("Duplicate link token".to_string()));
        }
        links.insert(link.token_hash.clone(), link.clone());
        Ok(())
    }

    async fn find_by_hash(&self, token_hash: &str) -> Result<Option<AccidentLink>> {
        Ok(self.links.read().await.get(token_hash).cloned())
    }

    async fn consume(&self, token_hash: &str, now: DateTime<Utc>) -> Result<Option<AccidentLink>> {
        let mut links = self.links.write().await;
        let Some(link) = links.get_mut(token_hash) else {
            return Ok(None);
        };

        if link.consumed_at.is_some() || link.expires_at <= now {
            return Ok(None);
        }

        link.consumed_at = Some(now);
        Ok(Some(link.clone()))
    }
}
