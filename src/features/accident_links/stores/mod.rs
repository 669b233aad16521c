mod memory_link_token_store;
mod pg_link_token_store;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::core::error::Result;
use crate::features::accident_links::models::AccidentLink;

pub use memory_link_token_store::InMemoryLinkTokenStore;
pub use pg_link_token_store::PgLinkTokenStore;

/// Persistence for issued links, keyed by token hash
#[async_trait]
pub trait LinkTokenStore: Send + Sync {
    async fn insert(&self, link: &AccidentLink) -> Result<()>;

    async fn find_by_hash(&self, token_hash: &str) -> Result<Option<AccidentLink>>;

    /// Mark the link consumed if it is still unconsumed and unexpired at
    /// `now`. Returns the updated link, or `None` when nothing qualified.
    async fn consume(&self, token_hash: &str, now: DateTime<Utc>) -> Result<Option<AccidentLink>>;
}
