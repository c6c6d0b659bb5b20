//! Quizmarize Config - Configuration management for the Quizmarize service.

mod config;
mod error;
mod paths;

pub use config::*;
pub use error::{ConfigError, ConfigResult};
pub use paths::AppPaths;
