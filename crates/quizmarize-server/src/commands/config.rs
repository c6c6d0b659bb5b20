//! Configuration commands.

use super::{get_paths, load_config};
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;

pub fn show(config_path: Option<&Path>) -> Result<()> {
    let paths = get_paths()?;
    let file = config_path.unwrap_or(paths.config_file.as_path());
    let config = load_config(config_path)?;

    let rendered = config.render_redacted().context("Failed to render config")?;

    println!("{}", "Effective Configuration".cyan().bold());
    println!("{}", "─".repeat(50));
    if file.exists() {
        println!("# file: {}", file.display());
    } else {
        println!("# file: {} (not found, using defaults)", file.display());
    }
    println!("# database: {}", config.database_path(&paths).display());
    println!("{}", rendered);

    if let Err(e) = config.validate() {
        println!("{} {}", "Warning:".yellow().bold(), e);
    }

    Ok(())
}
