//! Error types for multilang-client.

use thiserror::Error;

/// Main error type for all multilang operations.
#[derive(Debug, Error)]
pub enum MultilangError {
    /// I/O error on the stdin/stdout channel.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Protocol error (malformed handshake, invalid tuple shape, etc.).
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Unexpected failure escaping a processing callback. Fatal.
    #[error("processing failure: {0}")]
    Processing(String),

    /// The input stream closed. Fatal; the host must restart the worker.
    #[error("connection closed")]
    ConnectionClosed,
}

/// Result type alias using MultilangError.
pub type Result<T> = std::result::Result<T, MultilangError>;

/// Outcome of one auto-acknowledged bolt dispatch.
///
/// Distinguishes the declared per-tuple failure (the tuple is failed and the
/// loop continues) from everything else (logged to the host, loop
/// terminates). See [`crate::bolt::BasicBolt`].
#[derive(Debug, Error)]
pub enum ProcessError {
    /// Declared per-tuple failure; maps to a `fail` command.
    #[error("tuple processing failed")]
    Failed,

    /// Unexpected failure; logged to the host and fatal to the worker.
    #[error("{0}")]
    Fatal(String),
}

impl From<MultilangError> for ProcessError {
    fn from(err: MultilangError) -> Self {
        ProcessError::Fatal(err.to_string())
    }
}

impl From<serde_json::Error> for ProcessError {
    fn from(err: serde_json::Error) -> Self {
        ProcessError::Fatal(err.to_string())
    }
}

impl From<std::io::Error> for ProcessError {
    fn from(err: std::io::Error) -> Self {
        ProcessError::Fatal(err.to_string())
    }
}
