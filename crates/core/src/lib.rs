//! Core types and utilities for hookscope
//!
//! This is the foundation crate (Layer 0) that all other hookscope crates depend on.
//! It provides:
//! - Release versions and their total order
//! - Hook kinds and raw hook occurrences
//! - Base error types
//! - The snapshot provider seam used by the scheduler
//!
//! This crate has no dependencies on other hookscope crates.

pub mod error;
pub mod hook;
pub mod traits;
pub mod version;

pub use error::{Error, Result};
pub use hook::{HookOccurrence, HookType};
pub use traits::SnapshotProvider;
pub use version::Version;
