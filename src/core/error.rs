//! Error types for the dispatch engine.

use thiserror::Error;

/// Errors produced while building a task.
#[derive(Debug, Error)]
pub enum TaskBuildError {
    /// A render-config file was missing a required key.
    #[error("render config {path} missing required key `{key}`")]
    MissingRenderKey {
        /// Path to the render-config file.
        path: String,
        /// The missing key.
        key: String,
    },
    /// A render-config value could not be parsed as the expected type.
    #[error("render config {path} has invalid value for `{key}`: {reason}")]
    InvalidRenderValue {
        /// Path to the render-config file.
        path: String,
        /// The offending key.
        key: String,
        /// Why the value was rejected.
        reason: String,
    },
    /// Failed to read the render-config file from disk.
    #[error("failed to read render config {path}: {source}")]
    Io {
        /// Path to the render-config file.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Application-facing result using anyhow for CLI-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
