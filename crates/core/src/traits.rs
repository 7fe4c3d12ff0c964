//! Core behavioral traits for hookscope components
//!
//! The scheduler depends on these traits instead of concrete types so the
//! git-backed provisioner can be swapped for pre-materialized directories in
//! offline runs and tests.

use crate::Result;
use crate::version::Version;
use std::path::PathBuf;

/// Snapshot provider interface
///
/// Materializes the source subtree of one version and returns its root.
/// Implementations must be safe to call concurrently for *different*
/// versions; each version's snapshot lives in its own directory.
///
/// # Examples
///
/// ```ignore
/// fn scan(provider: &dyn SnapshotProvider, version: &Version) -> Result<()> {
///     let root = provider.provision(version)?;
///     // ... walk root
///     Ok(())
/// }
/// ```
pub trait SnapshotProvider: Send + Sync {
    /// Provision (or reuse) the snapshot for `version`
    fn provision(&self, version: &Version) -> Result<PathBuf>;
}

impl<T: SnapshotProvider + ?Sized> SnapshotProvider for &T {
    fn provision(&self, version: &Version) -> Result<PathBuf> {
        (**self).provision(version)
    }
}

impl<T: SnapshotProvider + ?Sized> SnapshotProvider for Box<T> {
    fn provision(&self, version: &Version) -> Result<PathBuf> {
        (**self).provision(version)
    }
}
