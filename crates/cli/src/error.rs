//! Error types for CLI commands
//!
//! Command-level failures are a thiserror enum; anything else travels as
//! `anyhow::Error` through the `Other` variant.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during command execution
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum CommandError {
    /// The catalog produced nothing to scan
    #[error("No versions to scan (the remote may be unreachable or no tag matched)")]
    NoVersions,

    /// The artifact could not be written
    #[error("Failed to write report to {}", .path.display())]
    ArtifactWrite {
        /// Destination of the artifact
        path: PathBuf,
        /// Underlying failure
        #[source]
        source: hookscope_core::Error,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[source] hookscope_core::Error),

    /// Directory given to `extract` does not exist
    #[error("Directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<hookscope_core::Error> for CommandError {
    fn from(err: hookscope_core::Error) -> Self {
        Self::Other(err.into())
    }
}

/// Result type alias for command operations
pub type Result<T> = std::result::Result<T, CommandError>;
