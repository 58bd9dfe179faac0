// crates/augur-cli/src/config.rs
//
// Runtime configuration for the augur CLI.
// Loaded from a TOML file or populated with sensible defaults.

use std::fs;

use augur_scoring::ScoringParams;
use serde::Deserialize;

use crate::error::CliError;

/// Runtime configuration for the CLI.
#[derive(Debug, Clone, Deserialize)]
pub struct CliConfig {
    /// Directory holding the RocksDB keeper.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Log level: "trace", "debug", "info", "warn", "error".
    /// `RUST_LOG` takes precedence when set.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Engine tuning, the `[scoring]` table.
    #[serde(default)]
    pub scoring: ScoringParams,
}

fn default_data_dir() -> String {
    "~/.augur/data".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            scoring: ScoringParams::default(),
        }
    }
}

impl CliConfig {
    /// Load configuration from a TOML file at the given path.
    ///
    /// Returns an error if the file cannot be read, parsed, or carries scoring
    /// parameters the engine cannot run with.
    pub fn load(path: &str) -> Result<Self, CliError> {
        let contents = fs::read_to_string(expand_tilde(path))?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration from TOML text.
    pub fn parse(contents: &str) -> Result<Self, CliError> {
        let config: CliConfig =
            toml::from_str(contents).map_err(|e| CliError::Config(e.to_string()))?;
        config.scoring.validate()?;
        Ok(config)
    }

    /// Path of the RocksDB keeper under `data_dir`.
    pub fn keeper_path(&self) -> String {
        format!("{}/keeper_rocksdb", expand_tilde(&self.data_dir))
    }
}

/// Expand a leading `~/` to the user's home directory.
pub fn expand_tilde(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return format!("{}/{}", home.display(), rest);
        }
    }
    path.to_string()
}
