//! Loads the workers-config and tasks-config files (§6), mapping each
//! failure onto the dispatcher CLI's documented exit codes.

use thiserror::Error;

use crate::config::{TasksConfig, WorkersConfig};
use crate::core::{Task, WorkerInfo};

/// A startup failure, tagged with the exit code the dispatcher CLI returns
/// for it (§6 "Dispatcher CLI ... Exit codes").
#[derive(Debug, Error)]
pub enum BuildError {
    /// Workers-config file could not be opened/read.
    #[error("failed to open workers config {path}: {source}")]
    WorkersFileOpen {
        /// Path that failed to open.
        path: String,
        #[source]
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Workers-config file opened but failed to parse/validate.
    #[error("failed to parse workers config {path}: {reason}")]
    WorkersFileParse {
        /// Path that failed to parse.
        path: String,
        /// Parse/validation failure reason.
        reason: String,
    },
    /// Tasks-config file could not be opened/read.
    #[error("failed to open tasks config {path}: {source}")]
    TasksFileOpen {
        /// Path that failed to open.
        path: String,
        #[source]
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Tasks-config file opened but failed to parse/validate/expand.
    #[error("failed to parse tasks config {path}: {source}")]
    TasksFileParse {
        /// Path that failed to parse.
        path: String,
        #[source]
        /// Underlying parse/build failure.
        source: crate::core::TaskBuildError,
    },
}

impl BuildError {
    /// The dispatcher CLI's documented exit code for this failure (§6).
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::WorkersFileOpen { .. } => 2,
            Self::WorkersFileParse { .. } => 3,
            Self::TasksFileOpen { .. } => 5,
            Self::TasksFileParse { .. } => 6,
        }
    }
}

/// Read and validate the workers-config file at `path` into a worker pool.
pub fn load_workers_file(path: &str) -> Result<Vec<WorkerInfo>, BuildError> {
    let text = std::fs::read_to_string(path).map_err(|source| BuildError::WorkersFileOpen {
        path: path.to_string(),
        source,
    })?;
    WorkersConfig::load(&text).map_err(|reason| BuildError::WorkersFileParse {
        path: path.to_string(),
        reason,
    })
}

/// Read and validate the tasks-config file at `path`, expanding every entry
/// into its `Task`s (a render entry becomes many fragment tasks).
pub fn load_tasks_file(path: &str, nb_workers: usize) -> Result<Vec<Task>, BuildError> {
    let text = std::fs::read_to_string(path).map_err(|source| BuildError::TasksFileOpen {
        path: path.to_string(),
        source,
    })?;
    TasksConfig::load(&text, nb_workers).map_err(|source| BuildError::TasksFileParse {
        path: path.to_string(),
        source,
    })
}
