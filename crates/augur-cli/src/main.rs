// crates/augur-cli/src/main.rs
//
// CLI entrypoint for the Augur scoring engine.
//
// Loads configuration, initializes tracing, and dispatches to the score,
// scores and coefficient subcommands. State lives in a RocksDB keeper under
// the configured data directory.

mod commands;
mod config;
mod error;
mod input;
mod output;
mod runner;

use clap::{Parser, Subcommand};
use commands::coefficient::CoefficientCmd;
use commands::score::ScoreCmd;
use commands::scores::ScoresCmd;
use config::CliConfig;
use error::CliError;

/// Augur: reputer and worker scoring for prediction topics.
#[derive(Parser, Debug)]
#[command(
    name = "augur",
    version = "0.1.0",
    about = "Score reputers and workers of prediction topics and inspect the results"
)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true, default_value = "~/.augur/config.toml")]
    config: String,

    /// Override the configured data directory.
    #[arg(long, global = true)]
    data_dir: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Score rounds from JSON round files.
    Score(ScoreCmd),

    /// Show the scores stored for a round.
    Scores(ScoresCmd),

    /// Show a reputer's listening coefficient on a topic.
    Coefficient(CoefficientCmd),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Configuration comes first so its log level can seed the filter. A missing
    // file falls back to defaults; a broken one is fatal.
    let loaded = match CliConfig::load(&cli.config) {
        Ok(cfg) => Ok(cfg),
        Err(CliError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Err(e),
        Err(e) => return Err(e.into()),
    };
    let mut cli_config = match &loaded {
        Ok(cfg) => cfg.clone(),
        Err(_) => CliConfig::default(),
    };
    if let Some(dir) = &cli.data_dir {
        cli_config.data_dir = dir.clone();
    }

    // Initialize tracing subscriber for structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli_config.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match loaded {
        Ok(_) => tracing::info!("Loaded configuration from {}", cli.config),
        Err(e) => tracing::warn!(
            "Could not load config from {}: {}. Using defaults.",
            cli.config,
            e
        ),
    }
    tracing::debug!("Data directory: {}", cli_config.data_dir);

    match &cli.command {
        Commands::Score(cmd) => {
            if !commands::score::run(cmd, &cli_config).await? {
                std::process::exit(1);
            }
        }
        Commands::Scores(cmd) => commands::scores::run(cmd, &cli_config).await?,
        Commands::Coefficient(cmd) => commands::coefficient::run(cmd, &cli_config).await?,
    }

    Ok(())
}
