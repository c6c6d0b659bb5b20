//! Quizmarize Storage - object storage for uploaded documents.
//!
//! Every backend implements [`BlobStore`]. The store is built once at
//! startup and shared as `Arc<dyn BlobStore>`.

mod backends;
mod error;
mod key;

pub use backends::local::LocalBlobStore;
pub use backends::memory::MemoryBlobStore;
pub use backends::s3::S3BlobStore;
pub use error::{StorageError, StorageResult};
pub use key::{object_key, public_read_policy, public_url};

use async_trait::async_trait;
use bytes::Bytes;
use quizmarize_config::{StorageBackend, StorageConfig};
use std::path::PathBuf;
use std::sync::Arc;

/// Operations every object store provides.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Create the bucket with a public-read policy if it is missing.
    async fn ensure_bucket_exists(&self) -> StorageResult<()>;

    /// Store `bytes` under `key` and return the object's public URL.
    async fn upload(&self, bytes: Bytes, key: &str, content_type: &str) -> StorageResult<String>;

    /// Fetch the whole object.
    async fn download(&self, key: &str) -> StorageResult<Bytes>;

    /// Public URL of `key`, whether or not it exists.
    fn public_url(&self, key: &str) -> String;
}

/// Build the backend selected by the configuration.
///
/// `default_local_root` is used by the local backend when the config does
/// not name a directory.
pub fn from_config(config: &StorageConfig, default_local_root: PathBuf) -> StorageResult<Arc<dyn BlobStore>> {
    let store: Arc<dyn BlobStore> = match config.backend {
        StorageBackend::S3 => Arc::new(S3BlobStore::new(config)?),
        StorageBackend::Local => {
            let root = config
                .local_root
                .as_ref()
                .map(PathBuf::from)
                .unwrap_or(default_local_root);
            Arc::new(LocalBlobStore::new(root, &config.bucket, &config.public_host))
        }
        StorageBackend::Memory => Arc::new(MemoryBlobStore::new(&config.bucket, &config.public_host)),
    };
    Ok(store)
}
