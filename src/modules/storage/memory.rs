use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::BlobStorage;
use crate::core::error::Result;

#[derive(Debug, Clone)]
pub struct StoredBlob {
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Keeps blobs in process memory and hands out `memory://` URLs
#[derive(Default)]
pub struct InMemoryBlobStorage {
    blobs: RwLock<HashMap<String, StoredBlob>>,
}

impl InMemoryBlobStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, path: &str) -> Option<StoredBlob> {
        self.blobs.read().await.get(path).cloned()
    }

    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }
}

#[async_trait]
impl BlobStorage for InMemoryBlobStorage {
    async fn store(&self, path: &str, data: Vec<u8>, content_type: &str) -> Result<String> {
        self.blobs.write().await.insert(
            path.to_string(),
            StoredBlob {
                content_type: content_type.to_string(),
                data,
            },
        );
        Ok(format!("memory://{}", path))
    }
}
