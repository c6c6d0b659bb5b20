//! In-process backend.

use crate::error::{StorageError, StorageResult};
use crate::key::public_url;
use crate::BlobStore;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct StoredObject {
    bytes: Bytes,
    content_type: String,
}

/// Keeps objects in a map. Nothing survives the process.
pub struct MemoryBlobStore {
    bucket: String,
    public_host: String,
    objects: RwLock<HashMap<String, StoredObject>>,
}

impl MemoryBlobStore {
    pub fn new(bucket: impl Into<String>, public_host: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            public_host: public_host.into(),
            objects: RwLock::new(HashMap::new()),
        }
    }

    /// Whether an object is stored under `key`.
    pub async fn contains(&self, key: &str) -> bool {
        self.objects.read().await.contains_key(key)
    }

    /// Number of stored objects.
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Content type recorded for `key`.
    pub async fn content_type(&self, key: &str) -> Option<String> {
        self.objects.read().await.get(key).map(|o| o.content_type.clone())
    }
}

impl Default for MemoryBlobStore {
    fn default() -> Self {
        Self::new("quizmarize", "localhost:9000")
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn ensure_bucket_exists(&self) -> StorageResult<()> {
        Ok(())
    }

    async fn upload(&self, bytes: Bytes, key: &str, content_type: &str) -> StorageResult<String> {
        self.objects.write().await.insert(
            key.to_string(),
            StoredObject {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(public_url(&self.public_host, &self.bucket, key))
    }

    async fn download(&self, key: &str) -> StorageResult<Bytes> {
        self.objects
            .read()
            .await
            .get(key)
            .map(|o| o.bytes.clone())
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    fn public_url(&self, key: &str) -> String {
        public_url(&self.public_host, &self.bucket, key)
    }
}
