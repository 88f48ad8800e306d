//! Layered error definitions
//!
//! Categorized by source: session state / transport / encoding / data / config

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Session State Errors =====
    /// `connect` called while a live connection exists
    #[error("already connected")]
    AlreadyConnected,

    /// Operation requires a live connection
    #[error("not connected")]
    NotConnected,

    // ===== Transport Errors =====
    /// Dial failure (fatal to the `connect` call, never retried)
    #[error("connection to '{address}' failed: {message}")]
    Connection { address: String, message: String },

    /// Transport write failure
    #[error("send failed: {message}")]
    Send { message: String },

    // ===== Encoding Errors =====
    /// Envelope could not be encoded
    #[error("serialization error: {message}")]
    Serialization { message: String },

    // ===== Data Errors =====
    /// Reference pattern directory missing or corrupt
    #[error("failed to load reference data from '{path}': {message}")]
    DataLoad { path: String, message: String },

    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ContractError {
    /// Create dial failure error
    pub fn connection(address: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Connection {
            address: address.into(),
            message: message.into(),
        }
    }

    /// Create send failure error
    pub fn send(message: impl Into<String>) -> Self {
        Self::Send {
            message: message.into(),
        }
    }

    /// Create serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Create data load error
    pub fn data_load(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DataLoad {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }
}
