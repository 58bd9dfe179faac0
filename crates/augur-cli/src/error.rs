// crates/augur-cli/src/error.rs

use augur_core::AugurError;
use thiserror::Error;

/// Errors surfaced by the augur CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Unreadable or malformed configuration.
    #[error("Config error: {0}")]
    Config(String),

    /// Unreadable or malformed round file.
    #[error("Round input error: {0}")]
    Input(String),

    /// Error returned by the engine or a keeper.
    #[error(transparent)]
    Engine(#[from] AugurError),

    /// Filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
