//! Where Quizmarize keeps its config, database and local blobs.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use std::path::PathBuf;

/// Overrides the platform directories with a single root.
pub const HOME_ENV: &str = "QUIZMARIZE_HOME";

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub config_dir: PathBuf,
    pub data_dir: PathBuf,
    pub config_file: PathBuf,
    pub database_file: PathBuf,
    /// Root of the `local` storage backend; buckets are subdirectories.
    pub blob_dir: PathBuf,
}

impl AppPaths {
    /// `$QUIZMARIZE_HOME` if set, otherwise the platform directories.
    pub fn resolve() -> ConfigResult<Self> {
        match std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
            Some(home) => Ok(Self::under(home)),
            None => {
                let dirs = ProjectDirs::from("com", "quizmarize", "quizmarize").ok_or(ConfigError::NoConfigDir)?;
                Ok(Self::from_dirs(dirs.config_dir().into(), dirs.data_dir().into()))
            }
        }
    }

    /// Everything below one directory: `config.toml` at the top, state in `data/`.
    pub fn under(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let data_dir = root.join("data");
        Self::from_dirs(root, data_dir)
    }

    fn from_dirs(config_dir: PathBuf, data_dir: PathBuf) -> Self {
        Self {
            config_file: config_dir.join("config.toml"),
            database_file: data_dir.join("quizmarize.db"),
            blob_dir: data_dir.join("blobs"),
            config_dir,
            data_dir,
        }
    }

    /// Create the config and data directories.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.config_dir)?;
        std::fs::create_dir_all(&self.data_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_under_root() {
        let paths = AppPaths::under("/srv/quizmarize");

        assert_eq!(paths.config_file, PathBuf::from("/srv/quizmarize/config.toml"));
        assert_eq!(paths.database_file, PathBuf::from("/srv/quizmarize/data/quizmarize.db"));
        assert_eq!(paths.blob_dir, PathBuf::from("/srv/quizmarize/data/blobs"));
    }

    #[test]
    fn test_ensure_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = AppPaths::under(tmp.path().join("home"));

        paths.ensure_dirs().unwrap();
        assert!(paths.config_dir.is_dir());
        assert!(paths.data_dir.is_dir());
        assert!(!paths.config_file.exists());
    }
}
