//! Error types for configuration, preference storage and versioning.
//!
//! Absent preference keys are not errors; reads report them as `None`.

use thiserror::Error;

/// Errors produced by this crate.
#[derive(Debug, Error)]
pub enum CodePushError {
    /// Cannot open or talk to the storage backend.
    #[error("connection error: {0}")]
    ConnectionError(String),

    /// Serialization or deserialization error.
    #[error("serialization error: {0}")]
    SerializationError(String),

    /// The bridge worker has stopped and can no longer answer requests.
    #[error("bridge closed: {0}")]
    BridgeClosed(String),

    /// A scripting caller invoked a method the bridge does not expose.
    #[error("unknown bridge method: {0}")]
    UnknownMethod(String),

    /// A scripting caller passed arguments of the wrong shape.
    #[error("invalid argument for {method}: {reason}")]
    InvalidArgument { method: String, reason: String },

    /// A release with this version is already in the history.
    #[error("v{0} is already released")]
    AlreadyReleased(String),

    /// No release with this version exists in the history.
    #[error("v{0} is not released")]
    NotReleased(String),

    /// The release history holds no enabled release.
    #[error("there is no latest release")]
    NoLatestRelease,

    /// A release version string could not be parsed by the versioning strategy.
    #[error("invalid release version '{version}': {reason}")]
    InvalidVersion { version: String, reason: String },

    /// Database error from SQLx.
    #[error("database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, CodePushError>;

impl CodePushError {
    /// Returns true if retrying the same operation may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CodePushError::ConnectionError(_)
                | CodePushError::DatabaseError(sqlx::Error::PoolTimedOut)
        )
    }
}

impl From<serde_json::Error> for CodePushError {
    fn from(err: serde_json::Error) -> Self {
        CodePushError::SerializationError(err.to_string())
    }
}
