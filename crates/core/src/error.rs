//! Base error types for hookscope
//!
//! This module provides the foundation error types that all crates can use.

use std::path::PathBuf;
use thiserror::Error;

/// Base error type for shared functionality
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Git error raised by libgit2
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    /// A string could not be parsed as a release version
    #[error("Invalid version '{input}': expected MAJOR.MINOR.PATCH (optionally prefixed with 'v') or 'latest'")]
    InvalidVersion {
        /// The rejected input
        input: String,
    },

    /// A snapshot could not be materialized for a version
    #[error("Failed to provision snapshot for {version}: {message}")]
    Snapshot {
        /// Version being provisioned
        version: String,
        /// What went wrong
        message: String,
    },

    /// A snapshot directory is missing
    #[error("Snapshot directory not found: {}", path.display())]
    SnapshotMissing {
        /// The directory that was expected to exist
        path: PathBuf,
    },

    /// Invalid configuration
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the problem
        message: String,
    },

    /// JSON serialization error
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error message
    #[error("{0}")]
    Message(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a `Snapshot` error for the given version
    pub fn snapshot(version: impl ToString, message: impl Into<String>) -> Self {
        Self::Snapshot {
            version: version.to_string(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_snapshot_error_mentions_version() {
        let err = Error::snapshot("v3.1.0", "ref not found");
        let msg = err.to_string();
        assert!(msg.contains("v3.1.0"));
        assert!(msg.contains("ref not found"));
    }

    #[test]
    fn test_invalid_version_message() {
        let err = Error::InvalidVersion {
            input: "banana".to_string(),
        };
        assert!(err.to_string().contains("banana"));
    }
}
