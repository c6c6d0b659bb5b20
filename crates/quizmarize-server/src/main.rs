//! Quizmarize CLI - run the API and manage its local state.

mod commands;

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Quizmarize - summaries and quizzes from your documents
#[derive(Parser)]
#[command(name = "quizmarize")]
#[command(version)]
#[command(about = "Summaries and quizzes from your documents", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use this config file instead of the platform default
    #[arg(long, global = true, env = "QUIZMARIZE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize Quizmarize (create config and database)
    Init,

    /// Run the HTTP API
    Serve {
        /// Override the configured port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Issue a bearer token, creating the user if needed
    Token {
        /// User email
        #[arg(short, long)]
        email: String,
    },

    /// Disable a user so their tokens stop working
    Deactivate {
        /// User email
        #[arg(short, long)]
        email: String,
    },

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the effective configuration with secrets masked
    Show,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("quizmarize=debug,tower_http=debug,info"))
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("quizmarize=info,tower_http=info,warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli.config.as_deref();
    let result = match cli.command {
        Commands::Init => commands::init::run(config_path),
        Commands::Serve { port } => commands::serve::run(config_path, port),
        Commands::Token { email } => commands::token::issue(config_path, &email),
        Commands::Deactivate { email } => commands::token::deactivate(config_path, &email),
        Commands::Config(cmd) => match cmd {
            ConfigCommands::Show => commands::config::show(config_path),
        },
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}
