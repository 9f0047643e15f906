// ABOUTME: Errors returned by the remote platform.
// ABOUTME: Exposes a retryability query instead of making callers match on variants.

/// Errors from platform operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("application '{0}' not found")]
    ApplicationNotFound(String),

    #[error("application '{0}' already exists")]
    ApplicationAlreadyExists(String),

    #[error("route {0} not found")]
    RouteNotFound(String),

    /// The transport could not rewind the request body and must resend it.
    #[error("upload interrupted before completion: {0}")]
    PipeSeek(String),

    #[error("staging failed: {0}")]
    StagingFailed(String),

    #[error("staging did not complete within {0} seconds")]
    StagingTimeout(u64),

    #[error("application instances did not start within {0} seconds")]
    StartupTimeout(u64),

    #[error("{0}")]
    Remote(String),
}

impl ApiError {
    /// Whether resending the same request may succeed.
    ///
    /// Only the pipe-seek class is retried; everything else is fatal for the
    /// step that saw it.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::PipeSeek(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ApiError::ApplicationNotFound(_) | ApiError::RouteNotFound(_)
        )
    }

    /// The underlying cause text, without the variant's framing.
    pub fn cause(&self) -> String {
        match self {
            ApiError::PipeSeek(cause) | ApiError::Remote(cause) => cause.clone(),
            other => other.to_string(),
        }
    }
}
