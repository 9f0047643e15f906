// ABOUTME: Error types for plan building and push steps.
// ABOUTME: Classifies failures as user, transient, remote or invariant errors.

use crate::platform::ApiError;
use crate::resources::ResourceError;
use crate::types::AppNameError;

/// Errors that stop a plan from being built or advanced.
#[derive(Debug, thiserror::Error)]
pub enum PushError {
    /// A platform call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Upload kept being interrupted and the retry bound ran out.
    #[error("upload failed after {attempts} attempts: {cause}")]
    UploadFailed {
        attempts: u32,
        #[source]
        cause: ApiError,
    },

    /// Resources were requested before any bits path was chosen.
    #[error("developer error: bits path was never set")]
    BitsPathUnset,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Resource(#[from] ResourceError),

    #[error("application '{0}' is not in the manifest")]
    AppNotFoundInManifest(String),

    #[error("an application name is required when there is no manifest")]
    MissingAppName,

    #[error(transparent)]
    InvalidAppName(#[from] AppNameError),

    #[error("invalid flags: {0}")]
    InvalidOverrides(String),

    /// A background task died before reporting back.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Coarse classification for caller-side messaging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushErrorKind {
    /// Bad input or missing things the user controls.
    User,
    /// Flaky transport; trying again later may work.
    Transient,
    /// The platform rejected or failed an operation.
    Remote,
    /// A sequencing bug, not something the user can fix.
    Invariant,
}

impl PushError {
    pub fn kind(&self) -> PushErrorKind {
        match self {
            PushError::Api(err) if err.is_retryable() => PushErrorKind::Transient,
            PushError::Api(
                ApiError::ApplicationNotFound(_)
                | ApiError::ApplicationAlreadyExists(_)
                | ApiError::RouteNotFound(_),
            ) => PushErrorKind::User,
            PushError::Api(_) => PushErrorKind::Remote,
            PushError::UploadFailed { .. } => PushErrorKind::Transient,
            PushError::BitsPathUnset | PushError::Internal(_) => PushErrorKind::Invariant,
            PushError::Io(_)
            | PushError::Resource(_)
            | PushError::AppNotFoundInManifest(_)
            | PushError::MissingAppName
            | PushError::InvalidAppName(_)
            | PushError::InvalidOverrides(_) => PushErrorKind::User,
        }
    }
}

impl From<tokio::task::JoinError> for PushError {
    fn from(err: tokio::task::JoinError) -> Self {
        PushError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_failed_keeps_the_cause() {
        let err = PushError::UploadFailed {
            attempts: 3,
            cause: ApiError::PipeSeek("connection reset".into()),
        };
        assert_eq!(err.kind(), PushErrorKind::Transient);
        assert!(err.to_string().contains("3 attempts"));
        assert!(err.to_string().contains("connection reset"));

        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(
            source.as_deref(),
            Some("upload interrupted before completion: connection reset")
        );
    }

    #[test]
    fn bits_path_unset_is_an_invariant_violation() {
        assert_eq!(PushError::BitsPathUnset.kind(), PushErrorKind::Invariant);
    }

    #[test]
    fn remote_failures_are_remote() {
        let err = PushError::from(ApiError::StagingFailed("buildpack crashed".into()));
        assert_eq!(err.kind(), PushErrorKind::Remote);

        let missing = PushError::from(ApiError::ApplicationNotFound("web".into()));
        assert_eq!(missing.kind(), PushErrorKind::User);
    }
}
