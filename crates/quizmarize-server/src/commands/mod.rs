//! CLI command implementations.

pub mod config;
pub mod init;
pub mod serve;
pub mod token;

use anyhow::{Context, Result};
use quizmarize_config::{AppPaths, Config};
use quizmarize_db::Database;
use std::path::Path;

/// Get the application paths, honouring `QUIZMARIZE_HOME`.
pub fn get_paths() -> Result<AppPaths> {
    AppPaths::resolve().context("Failed to determine application directories")
}

/// Load the configuration from `config_path` or the default location,
/// with `.env` and environment overrides applied.
pub fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let paths = get_paths()?;
    let path = config_path.unwrap_or(paths.config_file.as_path());
    Config::load_with_env(path).with_context(|| format!("Failed to load config from {}", path.display()))
}

/// Open the configured database.
pub fn open_database(config: &Config) -> Result<Database> {
    let paths = get_paths()?;
    let path = config.database_path(&paths);
    Database::open(&path).with_context(|| format!("Failed to open database at {}", path.display()))
}
