//! Run the HTTP API.

use super::{get_paths, load_config};
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;
use tokio::runtime::Runtime;

pub fn run(config_path: Option<&Path>, port: Option<u16>) -> Result<()> {
    let paths = get_paths()?;
    let mut config = load_config(config_path)?;
    if let Some(port) = port {
        config.server.port = port;
    }

    println!(
        "{} http://{}",
        "Quizmarize API on".cyan().bold(),
        config.server.bind_addr()
    );

    let rt = Runtime::new().context("Failed to create async runtime")?;
    rt.block_on(quizmarize_server::start_server(config, paths))
        .context("Server stopped with an error")?;

    Ok(())
}
