//! Signal model error types

use contracts::ContractError;
use thiserror::Error;

/// Signal model specific error
#[derive(Debug, Error)]
pub enum ModelError {
    /// CSV decoding failure
    #[error("failed to read '{path}': {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    /// Series file has no usable rows
    #[error("series '{path}' is unusable: {message}")]
    InvalidSeries { path: String, message: String },

    /// Wrapped ContractError
    #[error(transparent)]
    Contract(#[from] ContractError),
}

impl ModelError {
    /// Create invalid series error
    pub fn invalid_series(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidSeries {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl From<ModelError> for ContractError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::Contract(inner) => inner,
            ModelError::Csv { path, source } => ContractError::data_load(path, source.to_string()),
            ModelError::InvalidSeries { path, message } => ContractError::data_load(path, message),
        }
    }
}

/// Result alias
pub type Result<T> = std::result::Result<T, ModelError>;
