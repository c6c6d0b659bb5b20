//! User token commands.

use super::{load_config, open_database};
use anyhow::{Context, Result};
use colored::Colorize;
use quizmarize_server::session::SessionManager;
use std::path::Path;

pub fn issue(config_path: Option<&Path>, email: &str) -> Result<()> {
    let config = load_config(config_path)?;
    config.validate().context("Invalid configuration")?;

    let email = email.trim();
    if email.is_empty() || !email.contains('@') {
        anyhow::bail!("Not an email address: '{}'", email);
    }

    let db = open_database(&config)?;
    let user = db.get_or_create_user(email).context("Failed to load user")?;
    if !user.is_active {
        anyhow::bail!("User {} is deactivated", email);
    }

    let sessions = SessionManager::new(&config.auth.jwt_secret, config.auth.token_expiry_secs);
    let token = sessions
        .generate_token(&user)
        .context("Failed to sign token")?;

    eprintln!(
        "{} {} ({}), valid for {}s",
        "Token for".cyan().bold(),
        user.email,
        user.id,
        config.auth.token_expiry_secs
    );
    println!("{}", token);

    Ok(())
}

pub fn deactivate(config_path: Option<&Path>, email: &str) -> Result<()> {
    let config = load_config(config_path)?;
    let db = open_database(&config)?;

    let user = db
        .find_user_by_email(email.trim())?
        .with_context(|| format!("No user with email {}", email))?;
    db.set_user_active(&user.id, false)?;

    println!("{} {} deactivated", "✓".green(), user.email);
    Ok(())
}
