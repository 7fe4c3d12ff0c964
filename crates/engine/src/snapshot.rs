//! Snapshot provisioning
//!
//! A snapshot is a directory holding the allow-listed source subtree of one
//! version. Two providers exist: [`GitSnapshotProvider`] exports versions
//! from a shared bare mirror into a cache, and [`DirectorySnapshots`] serves
//! snapshots that already exist on disk.

use crate::git::Mirror;
use hookscope_config::Config;
use hookscope_core::{Error, Result, SnapshotProvider, Version};
use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::Instant;
use tracing::{debug, info};

/// Prefix of in-progress export directories inside the snapshot cache
const STAGING_PREFIX: &str = ".partial-";

/// Provisions snapshots from a bare git mirror
///
/// Release snapshots are immutable once exported and are reused across
/// runs. The `latest` snapshot is exported again on every call. Exports are
/// staged in a temporary directory and renamed into place, so a snapshot
/// directory never holds a partial export.
///
/// The cache and mirror are set up on first use, so a broken cache shows up
/// as failed versions rather than failing construction.
pub struct GitSnapshotProvider {
    root: PathBuf,
    remote: String,
    depth: Option<u32>,
    snapshots: PathBuf,
    directories: Vec<String>,
    extensions: HashSet<String>,
    latest_ref: String,
    // Fetches write refs and packs into the shared mirror; exports only read.
    mirror: Mutex<Option<Mirror>>,
}

impl GitSnapshotProvider {
    /// Create a provider rooted at the configured cache directory
    ///
    /// Layout: `<cache>/repo.git` for the mirror, `<cache>/snapshots/<version>`
    /// for exported trees.
    pub fn new(config: &Config) -> Self {
        let root = config.cache_root();
        Self {
            snapshots: root.join("snapshots"),
            root,
            remote: config.source.remote.clone(),
            depth: config.cache.shallow_depth(),
            directories: config.source.directories.clone(),
            extensions: config
                .scan
                .extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
            latest_ref: config.source.latest_ref.clone(),
            mirror: Mutex::new(None),
        }
    }

    /// Directory a version's snapshot is exported to
    pub fn snapshot_dir(&self, version: &Version) -> PathBuf {
        self.snapshots.join(version.to_string())
    }

    fn open_cache(&self) -> Result<Mirror> {
        fs::create_dir_all(&self.snapshots)?;
        let mirror = Mirror::open_or_init(&self.root.join("repo.git"), &self.remote, self.depth)?;
        info!(cache = %self.root.display(), remote = %self.remote, "Snapshot cache ready");
        Ok(mirror)
    }

    fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.contains(&ext.to_ascii_lowercase()))
    }

    fn export(&self, version: &Version, dest: &Path) -> Result<()> {
        let started = Instant::now();

        let (mirror, commit) = {
            let mut guard = self.mirror.lock().unwrap_or_else(PoisonError::into_inner);
            let mirror = match guard.as_ref() {
                Some(mirror) => mirror.clone(),
                None => guard.insert(self.open_cache()?).clone(),
            };
            let commit = mirror.fetch_version(version, &self.latest_ref)?;
            (mirror, commit)
        };

        let staging = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(&self.snapshots)?;
        let files = mirror.export(
            commit,
            &self.directories,
            |path| self.accepts(path),
            staging.path(),
        )?;

        if dest.exists() {
            fs::remove_dir_all(dest)?;
        }
        let staged = staging.keep();
        if let Err(e) = fs::rename(&staged, dest) {
            let _ = fs::remove_dir_all(&staged);
            // Another process finished the same export first
            if dest.is_dir() && !version.is_latest() {
                return Ok(());
            }
            return Err(e.into());
        }

        debug!(
            %version,
            files,
            elapsed = ?started.elapsed(),
            "Snapshot exported"
        );
        Ok(())
    }
}

impl SnapshotProvider for GitSnapshotProvider {
    fn provision(&self, version: &Version) -> Result<PathBuf> {
        let dest = self.snapshot_dir(version);
        if dest.is_dir() && !version.is_latest() {
            debug!(%version, "Reusing cached snapshot");
            return Ok(dest);
        }

        self.export(version, &dest).map_err(|e| match e {
            Error::Snapshot { .. } => e,
            other => Error::snapshot(version, other.to_string()),
        })?;
        Ok(dest)
    }
}

/// Serves snapshots from pre-materialized directories
///
/// `<root>/<version>` is used as the snapshot for `version`, where the
/// directory may be named `v1.2.3`, `1.2.3` or `latest`. Nothing is fetched.
#[derive(Debug, Clone)]
pub struct DirectorySnapshots {
    root: PathBuf,
}

impl DirectorySnapshots {
    /// Serve snapshots found under `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Versions that have a snapshot directory, in version order
    pub fn versions(&self) -> Result<Vec<Version>> {
        if !self.root.is_dir() {
            return Err(Error::SnapshotMissing {
                path: self.root.clone(),
            });
        }

        let mut versions = BTreeSet::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            if let Some(version) = entry
                .file_name()
                .to_str()
                .and_then(|name| name.parse::<Version>().ok())
            {
                versions.insert(version);
            }
        }
        Ok(versions.into_iter().collect())
    }
}

impl SnapshotProvider for DirectorySnapshots {
    fn provision(&self, version: &Version) -> Result<PathBuf> {
        std::iter::once(version.to_string())
            .chain(version.tag_candidates())
            .map(|name| self.root.join(name))
            .find(|path| path.is_dir())
            .ok_or_else(|| Error::SnapshotMissing {
                path: self.root.join(version.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_directory_snapshots_resolve_both_tag_forms() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("v1.0.0")).unwrap();
        fs::create_dir(dir.path().join("1.1.0")).unwrap();
        fs::create_dir(dir.path().join("latest")).unwrap();

        let snapshots = DirectorySnapshots::new(dir.path());
        let v100: Version = "1.0.0".parse().unwrap();
        let v110: Version = "v1.1.0".parse().unwrap();

        assert_eq!(snapshots.provision(&v100).unwrap(), dir.path().join("v1.0.0"));
        assert_eq!(snapshots.provision(&v110).unwrap(), dir.path().join("1.1.0"));
        assert_eq!(
            snapshots.provision(&Version::Latest).unwrap(),
            dir.path().join("latest")
        );
    }

    #[test]
    fn test_directory_snapshots_missing_version() {
        let dir = TempDir::new().unwrap();
        let snapshots = DirectorySnapshots::new(dir.path());
        let err = snapshots.provision(&Version::release(2, 0, 0)).unwrap_err();
        assert!(matches!(err, Error::SnapshotMissing { .. }));
    }

    #[test]
    fn test_directory_snapshots_list_versions() {
        let dir = TempDir::new().unwrap();
        for name in ["v1.10.0", "1.2.0", "latest", "notes", "v1.2.0"] {
            fs::create_dir(dir.path().join(name)).unwrap();
        }
        fs::write(dir.path().join("v9.0.0"), "file, not a dir").unwrap();

        let versions = DirectorySnapshots::new(dir.path()).versions().unwrap();
        assert_eq!(
            versions,
            vec![
                Version::release(1, 2, 0),
                Version::release(1, 10, 0),
                Version::Latest
            ]
        );
    }

    #[test]
    fn test_directory_snapshots_missing_root() {
        let snapshots = DirectorySnapshots::new("/nonexistent/hookscope/snapshots");
        assert!(snapshots.versions().is_err());
    }
}
