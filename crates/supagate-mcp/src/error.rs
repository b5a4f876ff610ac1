//! Error types for the MCP crate.
//!
//! These cover transport and serialization failures only. A denied or
//! failed tool call is not an error at this level; it travels back to the
//! caller as tool content with `isError` set.

use thiserror::Error;

/// Errors that can occur in the MCP gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Failed to start the gateway.
    #[error("failed to start MCP gateway: {0}")]
    StartupFailed(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
