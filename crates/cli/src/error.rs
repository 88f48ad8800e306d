//! Error types for CLI operations.

use contracts::ContractError;
use streamer::StreamerError;
use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Configuration load or validation error
    #[error("Invalid configuration: {0}")]
    Config(#[from] ContractError),

    /// Streaming session error
    #[error("Streaming failed: {0}")]
    Stream(#[from] StreamerError),
}

impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }
}
