//! S3-compatible backend (MinIO).

use crate::error::{StorageError, StorageResult};
use crate::key::{public_read_policy, public_url};
use crate::BlobStore;
use async_trait::async_trait;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use bytes::Bytes;
use quizmarize_config::StorageConfig;
use tracing::{debug, error, info};

/// Blob store backed by an S3-compatible server.
///
/// Uses path-style addressing and static credentials, which is what MinIO
/// expects.
pub struct S3BlobStore {
    client: Client,
    bucket: String,
    public_host: String,
}

impl S3BlobStore {
    /// Build a client from the storage configuration.
    pub fn new(config: &StorageConfig) -> StorageResult<Self> {
        if config.endpoint.trim().is_empty() {
            return Err(StorageError::Config("storage endpoint is empty".to_string()));
        }

        let endpoint = if config.endpoint.starts_with("http://") || config.endpoint.starts_with("https://") {
            config.endpoint.clone()
        } else {
            format!("http://{}", config.endpoint)
        };

        let credentials = Credentials::new(
            config.access_key.clone(),
            config.secret_key.clone(),
            None,
            None,
            "quizmarize",
        );

        let sdk_config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(endpoint)
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        Ok(Self {
            client: Client::from_conf(sdk_config),
            bucket: config.bucket.clone(),
            public_host: config.public_host.clone(),
        })
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn ensure_bucket_exists(&self) -> StorageResult<()> {
        match self.client.head_bucket().bucket(&self.bucket).send().await {
            Ok(_) => {
                debug!("Bucket '{}' already exists", self.bucket);
                return Ok(());
            }
            Err(e) => {
                let missing = e.as_service_error().map(|se| se.is_not_found()).unwrap_or(false)
                    || e.raw_response().map(|r| r.status().as_u16() == 404).unwrap_or(false);
                if !missing {
                    error!("Error checking bucket '{}': {}", self.bucket, DisplayErrorContext(&e));
                    return Err(StorageError::Transport(DisplayErrorContext(&e).to_string()));
                }
            }
        }

        self.client
            .create_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(|e| {
                error!("Error creating bucket '{}': {}", self.bucket, DisplayErrorContext(&e));
                StorageError::Transport(DisplayErrorContext(&e).to_string())
            })?;

        self.client
            .put_bucket_policy()
            .bucket(&self.bucket)
            .policy(public_read_policy(&self.bucket))
            .send()
            .await
            .map_err(|e| {
                error!("Error setting policy on '{}': {}", self.bucket, DisplayErrorContext(&e));
                StorageError::Transport(DisplayErrorContext(&e).to_string())
            })?;

        info!("Bucket '{}' created with public-read policy", self.bucket);
        Ok(())
    }

    async fn upload(&self, bytes: Bytes, key: &str, content_type: &str) -> StorageResult<String> {
        let size = bytes.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .content_length(size as i64)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| {
                error!("Error uploading '{}': {}", key, DisplayErrorContext(&e));
                StorageError::Transport(DisplayErrorContext(&e).to_string())
            })?;

        debug!("Uploaded {} bytes to {}/{}", size, self.bucket, key);
        Ok(public_url(&self.public_host, &self.bucket, key))
    }

    async fn download(&self, key: &str) -> StorageResult<Bytes> {
        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().map(|se| se.is_no_such_key()).unwrap_or(false) {
                    error!("Object {} does not exist", key);
                    StorageError::NotFound(key.to_string())
                } else {
                    error!("Error downloading '{}': {}", key, DisplayErrorContext(&e));
                    StorageError::Transport(DisplayErrorContext(&e).to_string())
                }
            })?;

        let data = response.body.collect().await.map_err(|e| {
            error!("Error reading body of '{}': {}", key, e);
            StorageError::Transport(e.to_string())
        })?;

        Ok(data.into_bytes())
    }

    fn public_url(&self, key: &str) -> String {
        public_url(&self.public_host, &self.bucket, key)
    }
}
