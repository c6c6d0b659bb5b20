//! Configuration structures and loading.

use crate::error::{ConfigError, ConfigResult};
use crate::paths::AppPaths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub auth: AuthConfig,
}

impl Config {
    /// Load a config file (if present), then apply `.env` and environment overrides.
    pub fn load_with_env(path: &Path) -> ConfigResult<Self> {
        if let Ok(env_file) = dotenvy::dotenv() {
            debug!("Loaded environment from {}", env_file.display());
        }

        let mut config = Self::load_from(path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Render as TOML with secrets masked.
    pub fn render_redacted(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(&self.redacted())?)
    }

    /// Create a default config file with comments.
    pub fn create_default_file(path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, Self::default_config_string())?;
        Ok(())
    }

    /// Overlay values from environment variables.
    ///
    /// Variable names follow the deployment `.env` file (`MINIO_*`,
    /// `OPENAI_API_KEY`, `SECRET_KEY`, ...). `lookup` is injected so tests
    /// never touch the process environment.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("MINIO_ENDPOINT") {
            self.storage.endpoint = v;
        }
        if let Some(v) = get("MINIO_PUBLIC_HOST") {
            self.storage.public_host = v;
        }
        if let Some(v) = get("MINIO_ROOT_USER") {
            self.storage.access_key = v;
        }
        if let Some(v) = get("MINIO_ROOT_PASSWORD") {
            self.storage.secret_key = v;
        }
        if let Some(v) = get("MINIO_BUCKET_NAME") {
            self.storage.bucket = v;
        }
        if let Some(v) = get("OPENAI_API_KEY") {
            self.llm.api_key = Some(v);
        }
        if let Some(v) = get("SECRET_KEY") {
            self.auth.jwt_secret = v;
        }
        if let Some(v) = get("DATABASE_PATH") {
            self.database.path = Some(v);
        }
        if let Some(v) = get("QUIZMARIZE_PORT") {
            match v.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!("Ignoring invalid QUIZMARIZE_PORT: {}", v),
            }
        }
    }

    /// Reject configurations the server cannot start with.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.auth.jwt_secret.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "auth.jwt_secret is empty (set it in config.toml or SECRET_KEY)".to_string(),
            ));
        }
        if self.storage.bucket.trim().is_empty() {
            return Err(ConfigError::Invalid("storage.bucket is empty".to_string()));
        }
        if self.llm.model.trim().is_empty() {
            return Err(ConfigError::Invalid("llm.model is empty".to_string()));
        }
        if self.server.max_upload_bytes == 0 {
            return Err(ConfigError::Invalid(
                "server.max_upload_bytes must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Resolve the database file, falling back to the platform data dir.
    pub fn database_path(&self, paths: &AppPaths) -> PathBuf {
        self.database
            .path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| paths.database_file.clone())
    }

    /// Copy of this config with secrets masked, for display.
    pub fn redacted(&self) -> Self {
        let mask = |s: &str| if s.is_empty() { String::new() } else { "********".to_string() };

        let mut config = self.clone();
        config.storage.secret_key = mask(&config.storage.secret_key);
        config.llm.api_key = config.llm.api_key.as_deref().map(mask);
        config.auth.jwt_secret = mask(&config.auth.jwt_secret);
        config
    }

    /// Generate a default config file with helpful comments.
    pub fn default_config_string() -> String {
        r#"# Quizmarize Configuration
# Values here can be overridden by environment variables or a .env file.

[server]
bind_address = "127.0.0.1"
port = 8000
# Largest accepted upload body, in bytes
max_upload_bytes = 26214400

[database]
# SQLite database file (default: platform data dir)
# path = "/var/lib/quizmarize/quizmarize.db"

[storage]
# Backend: "s3" (MinIO or any S3-compatible store), "local", or "memory"
backend = "s3"
endpoint = "localhost:9000"        # MINIO_ENDPOINT
public_host = "localhost:9000"     # host used in public file URLs
access_key = "minioadmin"          # MINIO_ROOT_USER
secret_key = "minioadmin"          # MINIO_ROOT_PASSWORD
bucket = "quizmarize"              # MINIO_BUCKET_NAME
region = "us-east-1"
# Root directory for the "local" backend
# local_root = "/var/lib/quizmarize/blobs"

[llm]
# Provider: "openai" (any OpenAI-compatible endpoint) or "ollama"
provider = "openai"
base_url = "https://api.openai.com/v1"
model = "gpt-3.5-turbo"
# api_key = "sk-..."               # OPENAI_API_KEY
timeout_seconds = 120

[auth]
# Shared HS256 secret used to verify bearer tokens (SECRET_KEY)
jwt_secret = ""
token_expiry_secs = 86400
"#
        .to_string()
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub max_upload_bytes: usize,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 8000,
            max_upload_bytes: 25 * 1024 * 1024,
        }
    }
}

/// Database settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: Option<String>,
}

/// Which blob store implementation to construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    S3,
    Local,
    Memory,
}

/// Object storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub endpoint: String,
    pub public_host: String,
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
    pub region: String,
    pub local_root: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::S3,
            endpoint: "localhost:9000".to_string(),
            public_host: "localhost:9000".to_string(),
            access_key: "minioadmin".to_string(),
            secret_key: "minioadmin".to_string(),
            bucket: "quizmarize".to_string(),
            region: "us-east-1".to_string(),
            local_root: None,
        }
    }
}

/// Which completion API to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LlmProvider {
    #[default]
    #[serde(rename = "openai")]
    OpenAi,
    #[serde(rename = "ollama")]
    Ollama,
}

/// Language model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_seconds: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::OpenAi,
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            model: "gpt-3.5-turbo".to_string(),
            timeout_seconds: 120,
        }
    }
}

/// Bearer token settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_expiry_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_expiry_secs: 86_400,
        }
    }
}
