//! # Hookscope Engine
//!
//! Builds a cross-version history of extension points from many releases of
//! one codebase.
//!
//! The pipeline, leaves first:
//!
//! - **Catalog**: enumerate release tags and order them
//! - **Snapshots**: materialize the relevant subtree of each version from a
//!   shared bare repository
//! - **Extraction**: pattern-match the four hook kinds in a snapshot
//! - **Normalization**: reduce raw argument text to structural tokens
//! - **Scheduling**: run snapshot + extraction for many versions on a bounded
//!   worker pool
//! - **Merging**: fold every worker's output into one hook index
//! - **Consolidation**: derive per-version argument signatures
//! - **Report**: summary statistics and the JSON artifact

pub mod catalog;
pub mod consolidate;
pub mod extract;
pub mod git;
pub mod merge;
pub mod normalize;
pub mod report;
pub mod scheduler;
pub mod snapshot;
pub mod syntax;

// Re-export error types from core
pub use hookscope_core::{Error, HookOccurrence, HookType, Result, SnapshotProvider, Version};

// Re-export commonly used types
pub use catalog::VersionCatalog;
pub use consolidate::ArgumentSignatureEntry;
pub use extract::Extractor;
pub use git::Mirror;
pub use merge::{HookIndex, HookRecord, Location};
pub use report::{Report, write_report};
pub use scheduler::{MAX_WORKERS, Scheduler, VersionScan};
pub use snapshot::{DirectorySnapshots, GitSnapshotProvider};
