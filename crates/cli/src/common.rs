//! Common types shared across CLI commands

use hookscope_config::Config;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Runtime context for CLI commands
///
/// Holds the loaded configuration and where it came from.
#[derive(Debug, Clone)]
pub struct RuntimeContext {
    /// Shared configuration
    pub config: Arc<Config>,
    /// Config file consulted, whether or not it exists
    pub config_path: PathBuf,
}

impl RuntimeContext {
    /// Create a new runtime context
    pub fn new(config: Config, config_path: impl Into<PathBuf>) -> Self {
        Self {
            config: Arc::new(config),
            config_path: config_path.into(),
        }
    }

    /// Config file path
    #[inline]
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Whether the config file exists on disk
    pub fn config_exists(&self) -> bool {
        self.config_path.is_file()
    }
}
