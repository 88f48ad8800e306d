//! Streamer error types

use contracts::ContractError;
use thiserror::Error;

/// Streamer-specific errors
#[derive(Debug, Error)]
pub enum StreamerError {
    /// Lifecycle misuse or transport failure (from contract)
    #[error(transparent)]
    Contract(#[from] ContractError),

    /// Emission task panicked or was aborted
    #[error("emission task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl StreamerError {
    /// Underlying contract error, if any
    pub fn as_contract(&self) -> Option<&ContractError> {
        match self {
            Self::Contract(e) => Some(e),
            Self::Task(_) => None,
        }
    }
}
