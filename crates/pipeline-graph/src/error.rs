//! Error types for the pipeline graph

use thiserror::Error;

use crate::config::ConfigError;

/// Result type alias using GraphError
pub type Result<T> = std::result::Result<T, GraphError>;

/// Errors that can occur in the pipeline graph
///
/// None of these are fatal to an editing session; the session layer
/// downgrades every one of them to a logged warning or an empty graph.
#[derive(Debug, Error)]
pub enum GraphError {
    /// Component type is not in the catalog
    #[error("Unknown component type: {0}")]
    UnknownComponent(String),

    /// Workflow template is not registered
    #[error("Unknown workflow template: {0}")]
    UnknownTemplate(String),

    /// Persisted document could not be decoded
    #[error("Malformed workflow document: {0}")]
    MalformedDocument(String),

    /// Storage backend refused a read or write
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Compression error
    #[error("Compression error: {0}")]
    Compression(String),

    /// Designer configuration could not be read or written
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GraphError {
    /// Create a storage error with a message
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a malformed-document error with a message
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedDocument(msg.into())
    }
}
