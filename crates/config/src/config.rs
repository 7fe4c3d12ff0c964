//! Configuration management
//!
//! This module handles loading hookscope configuration from `hookscope.toml`.
//! Every field has a default, so an empty file (or no file at all) is a
//! valid configuration that scans the upstream Discourse repository.

use crate::Result;
use hookscope_core::Version;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Upstream repository section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Remote URL (or local path) supplying tags and refs
    #[serde(default = "default_remote")]
    pub remote: String,

    /// Ref scanned for the "latest" sentinel version
    #[serde(default = "default_latest_ref", rename = "latestRef")]
    pub latest_ref: String,

    /// Append the "latest" sentinel to the catalog
    #[serde(default = "default_true", rename = "includeLatest")]
    pub include_latest: bool,

    /// Ignore releases older than this version
    #[serde(default, rename = "minVersion")]
    pub min_version: Option<Version>,

    /// Top-level directories exported into each snapshot
    #[serde(default = "default_directories")]
    pub directories: Vec<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            remote: default_remote(),
            latest_ref: default_latest_ref(),
            include_latest: true,
            min_version: None,
            directories: default_directories(),
        }
    }
}

/// File selection section for the extractor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Extensions (without the dot) of files worth scanning
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Directory names never descended into
    #[serde(default = "default_exclude_dirs", rename = "excludeDirs")]
    pub exclude_dirs: Vec<String>,

    /// Substrings marking a file name as a test or spec file
    #[serde(default = "default_exclude_file_markers", rename = "excludeFileMarkers")]
    pub exclude_file_markers: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            exclude_dirs: default_exclude_dirs(),
            exclude_file_markers: default_exclude_file_markers(),
        }
    }
}

/// Worker pool section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParallelConfig {
    /// Upper bound on concurrent version workers
    #[serde(default = "default_max_workers", rename = "maxWorkers")]
    pub max_workers: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            max_workers: default_max_workers(),
        }
    }
}

/// Snapshot cache section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache root (defaults to the XDG cache directory)
    #[serde(default)]
    pub dir: Option<PathBuf>,

    /// Depth for shallow fetches; `0` fetches full history
    #[serde(default = "default_fetch_depth", rename = "fetchDepth")]
    pub fetch_depth: u32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: None,
            fetch_depth: default_fetch_depth(),
        }
    }
}

impl CacheConfig {
    /// Shallow fetch depth, `None` when full history is requested
    #[must_use]
    pub fn shallow_depth(&self) -> Option<u32> {
        (self.fetch_depth > 0).then_some(self.fetch_depth)
    }
}

/// Artifact section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Where the JSON artifact is written
    #[serde(default = "default_output_path")]
    pub path: PathBuf,

    /// Length of the "most changes" and "retired" summary lists
    #[serde(default = "default_top_n", rename = "topN")]
    pub top_n: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            top_n: default_top_n(),
        }
    }
}

/// Hookscope configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Upstream repository configuration
    #[serde(default)]
    pub source: SourceConfig,

    /// File selection configuration
    #[serde(default)]
    pub scan: ScanConfig,

    /// Worker pool configuration
    #[serde(default)]
    pub parallel: ParallelConfig,

    /// Snapshot cache configuration
    #[serde(default)]
    pub cache: CacheConfig,

    /// Artifact configuration
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_remote() -> String {
    "https://github.com/discourse/discourse.git".to_string()
}

fn default_latest_ref() -> String {
    "main".to_string()
}

fn default_true() -> bool {
    true
}

fn default_directories() -> Vec<String> {
    ["app", "lib", "plugins", "frontend"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_extensions() -> Vec<String> {
    ["js", "gjs", "ts", "gts", "hbs", "mjs"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_exclude_dirs() -> Vec<String> {
    [
        "node_modules",
        "vendor",
        ".git",
        "test",
        "tests",
        "spec",
        "__tests__",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_exclude_file_markers() -> Vec<String> {
    ["-test.", ".test.", "_test.", "-spec.", ".spec.", "_spec."]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_max_workers() -> usize {
    10
}

fn default_fetch_depth() -> u32 {
    1
}

fn default_output_path() -> PathBuf {
    PathBuf::from("hooks.json")
}

fn default_top_n() -> usize {
    10
}

impl Config {
    /// Load configuration from a file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read, TOML parsing fails or validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            hookscope_core::Error::Message(format!(
                "Failed to read config file {}: {e}",
                path.as_ref().display()
            ))
        })?;

        let base_dir = path
            .as_ref()
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);

        Self::from_toml_str(&content, &base_dir).map_err(|e| {
            hookscope_core::Error::Message(format!(
                "Failed to load config file {}: {e}",
                path.as_ref().display()
            ))
        })
    }

    /// Load configuration if the file exists, defaults otherwise
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            tracing::debug!(
                path = %path.as_ref().display(),
                "Config file not found, using defaults"
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from TOML string
    ///
    /// Relative paths are resolved against `base_dir`.
    ///
    /// # Errors
    ///
    /// Returns error if TOML parsing or validation fails
    pub fn from_toml_str(toml_content: &str, base_dir: &Path) -> Result<Self> {
        let mut config: Self = toml::from_str(toml_content).map_err(|e| {
            hookscope_core::Error::InvalidConfig {
                message: e.to_string(),
            }
        })?;

        config.resolve_relative_paths(base_dir);
        config.validate()?;
        Ok(config)
    }

    /// Check invariants serde cannot express
    fn validate(&self) -> Result<()> {
        if self.parallel.max_workers == 0 {
            return Err(hookscope_core::Error::InvalidConfig {
                message: "parallel.maxWorkers must be at least 1".to_string(),
            });
        }
        if self.source.directories.is_empty() {
            return Err(hookscope_core::Error::InvalidConfig {
                message: "source.directories must list at least one directory".to_string(),
            });
        }
        if self.scan.extensions.is_empty() {
            return Err(hookscope_core::Error::InvalidConfig {
                message: "scan.extensions must list at least one extension".to_string(),
            });
        }
        Ok(())
    }

    /// Resolve relative paths in configuration
    fn resolve_relative_paths(&mut self, base_dir: &Path) {
        if let Some(ref dir) = self.cache.dir {
            self.cache.dir = Some(Self::resolve_path(dir, base_dir));
        }
        self.output.path = Self::resolve_path(&self.output.path, base_dir);
    }

    /// Resolve a single path: expand ~/ and resolve relative paths
    fn resolve_path(path: &Path, base_dir: &Path) -> PathBuf {
        let path_str = path.to_string_lossy();

        if let Some(stripped) = path_str.strip_prefix("~/") {
            if let Some(home) = ::dirs::home_dir() {
                return home.join(stripped);
            }
        } else if path_str == "~"
            && let Some(home) = ::dirs::home_dir()
        {
            return home;
        }

        if path.is_relative() {
            base_dir.join(path)
        } else {
            path.to_path_buf()
        }
    }

    /// Cache root, falling back to the XDG cache directory
    #[must_use]
    pub fn cache_root(&self) -> PathBuf {
        self.cache
            .dir
            .clone()
            .or_else(crate::dirs::cache_dir)
            .unwrap_or_else(|| PathBuf::from(".hookscope-cache"))
    }
}
