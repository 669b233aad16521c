//! Blob storage for accident photos
//!
//! Attachments are written once and referenced by URL from the report.
//! MinIO (or any S3-compatible service) backs production; the in-memory
//! store is used for local runs and tests.

mod memory;
mod minio_client;

use async_trait::async_trait;

use crate::core::error::Result;

pub use memory::InMemoryBlobStorage;
pub use minio_client::MinIOClient;

#[async_trait]
pub trait BlobStorage: Send + Sync {
    /// Store `data` under `path` and return the URL it can be fetched from
    async fn store(&self, path: &str, data: Vec<u8>, content_type: &str) -> Result<String>;
}
