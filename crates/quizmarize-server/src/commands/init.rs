//! Initialize Quizmarize.

use super::{get_paths, load_config, open_database};
use anyhow::{Context, Result};
use colored::Colorize;
use quizmarize_config::Config;
use std::path::Path;

pub fn run(config_path: Option<&Path>) -> Result<()> {
    let paths = get_paths()?;
    let config_file = config_path.unwrap_or(paths.config_file.as_path());

    if config_file.exists() {
        println!(
            "{} Quizmarize is already initialized.",
            "Note:".yellow().bold()
        );
        println!("  Config: {}", config_file.display());
        return Ok(());
    }

    println!("{}", "Initializing Quizmarize...".cyan().bold());

    paths
        .ensure_dirs()
        .context("Failed to create directories")?;
    println!("  {} Created directories", "✓".green());

    Config::create_default_file(config_file).context("Failed to create config file")?;
    println!(
        "  {} Created config: {}",
        "✓".green(),
        config_file.display()
    );

    let config = load_config(config_path)?;
    let _db = open_database(&config)?;
    println!(
        "  {} Created database: {}",
        "✓".green(),
        config.database_path(&paths).display()
    );

    println!();
    println!("{}", "Quizmarize initialized successfully!".green().bold());
    println!();
    println!("Next steps:");
    println!(
        "  1. Set auth.jwt_secret in {} (or SECRET_KEY)",
        config_file.display()
    );
    println!(
        "  2. Start the API: {}",
        "quizmarize serve".cyan()
    );
    println!(
        "  3. Get a token: {}",
        "quizmarize token --email you@example.com".cyan()
    );

    Ok(())
}
