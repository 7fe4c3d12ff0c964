//! Configuration management for hookscope
//!
//! This crate handles:
//! - Configuration loading and validation
//! - XDG directory management
//! - Logging initialization

pub mod config;
pub mod dirs;
pub mod logging;

// Re-export error types from core
pub use hookscope_core::{Error, Result};

// Re-export main types
pub use config::{CacheConfig, Config, OutputConfig, ParallelConfig, ScanConfig, SourceConfig};
pub use dirs::cache_dir;
