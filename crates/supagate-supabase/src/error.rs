//! Forwarding error types.

/// Errors from executing an allowed operation.
#[derive(Debug, thiserror::Error)]
pub enum ForwardError {
    /// Transport-level failure talking to the Management API.
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// The Management API answered with a non-success status.
    #[error("Management API returned {status}: {message}")]
    Api { status: u16, message: String },

    /// No token was configured and the request carried none.
    #[error("no access token available; configure one or send a bearer token")]
    MissingCredentials,

    /// A project-scoped operation arrived without a project ref.
    #[error("operation '{0}' requires a project ref")]
    MissingProjectRef(String),

    /// A required argument was absent or had the wrong type.
    #[error("argument '{argument}' is missing for operation '{operation}'")]
    MissingArgument { operation: String, argument: String },

    /// The operation name is not one this forwarder knows.
    #[error("operation '{0}' is not supported by this forwarder")]
    UnsupportedOperation(String),

    /// The API answered successfully but with an unusable payload.
    #[error("unexpected response shape: {0}")]
    UnexpectedResponse(String),
}

impl ForwardError {
    /// Create a missing-argument error.
    pub fn missing_argument(operation: &str, argument: &str) -> Self {
        Self::MissingArgument {
            operation: operation.to_string(),
            argument: argument.to_string(),
        }
    }
}
