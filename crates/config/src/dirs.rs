//! XDG directory utilities
//!
//! This module provides XDG-compliant directory paths for hookscope.
//! It follows the XDG Base Directory specification using the `xdg` crate:
//! `XDG_CACHE_HOME` defaults to ~/.cache.

use std::path::PathBuf;
use xdg::BaseDirectories;

/// Get the hookscope cache directory
///
/// Holds the shared bare repository and the per-version snapshots.
/// Returns `$XDG_CACHE_HOME/hookscope` or `~/.cache/hookscope`
#[must_use]
pub fn cache_dir() -> Option<PathBuf> {
    BaseDirectories::with_prefix("hookscope").get_cache_home()
}

/// Get the default config file path
///
/// `hookscope.toml` in the current directory.
#[must_use]
pub fn default_config_file() -> PathBuf {
    PathBuf::from("hookscope.toml")
}
