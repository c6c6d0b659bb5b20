//! Filesystem backend for development setups without an object server.

use crate::error::{StorageError, StorageResult};
use crate::key::public_url;
use crate::BlobStore;
use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, error};

/// Stores each object as a file under `<root>/<bucket>/<key>`.
pub struct LocalBlobStore {
    root: PathBuf,
    bucket: String,
    public_host: String,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>, bucket: impl Into<String>, public_host: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            bucket: bucket.into(),
            public_host: public_host.into(),
        }
    }

    fn bucket_dir(&self) -> PathBuf {
        self.root.join(&self.bucket)
    }

    fn object_path(&self, key: &str) -> StorageResult<PathBuf> {
        let relative = Path::new(key);
        let safe = !key.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.bucket_dir().join(relative))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn ensure_bucket_exists(&self) -> StorageResult<()> {
        tokio::fs::create_dir_all(self.bucket_dir()).await?;
        Ok(())
    }

    async fn upload(&self, bytes: Bytes, key: &str, _content_type: &str) -> StorageResult<String> {
        let path = self.object_path(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, &bytes).await.map_err(|e| {
            error!("Error writing {}: {}", path.display(), e);
            StorageError::from(e)
        })?;
        debug!("Stored {} bytes at {}", bytes.len(), path.display());
        Ok(public_url(&self.public_host, &self.bucket, key))
    }

    async fn download(&self, key: &str) -> StorageResult<Bytes> {
        let path = self.object_path(key)?;
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                error!("Object {} does not exist", key);
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => {
                error!("Error reading {}: {}", path.display(), e);
                Err(StorageError::from(e))
            }
        }
    }

    fn public_url(&self, key: &str) -> String {
        public_url(&self.public_host, &self.bucket, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> LocalBlobStore {
        LocalBlobStore::new(dir.path(), "quizmarize", "localhost:8000")
    }

    #[tokio::test]
    async fn test_upload_then_download() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.ensure_bucket_exists().await.unwrap();
        store.ensure_bucket_exists().await.unwrap();

        let url = store
            .upload(Bytes::from_static(b"hello"), "user_1/abc.txt", "text/plain")
            .await
            .unwrap();
        assert_eq!(url, "http://localhost:8000/quizmarize/user_1/abc.txt");
        assert!(dir.path().join("quizmarize/user_1/abc.txt").exists());

        let data = store.download("user_1/abc.txt").await.unwrap();
        assert_eq!(&data[..], b"hello");
    }

    #[tokio::test]
    async fn test_missing_object() {
        let dir = TempDir::new().unwrap();
        let err = store(&dir).download("user_1/none.pdf").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_rejects_escaping_keys() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        for key in ["../outside.txt", "/etc/passwd", ""] {
            let err = store
                .upload(Bytes::from_static(b"x"), key, "text/plain")
                .await
                .unwrap_err();
            assert!(matches!(err, StorageError::InvalidKey(_)), "key {:?}", key);
        }
    }
}
