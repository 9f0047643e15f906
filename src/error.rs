// ABOUTME: Application-wide error types for cfpush.
// ABOUTME: Uses thiserror for ergonomic error handling.

use std::path::PathBuf;
use thiserror::Error;

use crate::push::PushError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("manifest not found: {0}")]
    ManifestNotFound(PathBuf),

    #[error("invalid manifest: {0}")]
    InvalidManifest(String),

    #[error("invalid flags: {0}")]
    InvalidFlags(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Push(#[from] PushError),

    #[error("preparing space {space} failed: {source}")]
    PrepareSpaceFailed {
        space: String,
        #[source]
        source: PushError,
    },

    #[error("push of {app} failed: {source}")]
    AppPushFailed {
        app: String,
        #[source]
        source: PushError,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
