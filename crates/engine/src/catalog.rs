//! Version discovery
//!
//! Turns the remote's tag list into the ordered list of versions to scan:
//! release tags only, deduplicated, oldest first, with the `latest` sentinel
//! appended when requested.

use crate::git::list_remote_tags;
use hookscope_config::SourceConfig;
use hookscope_core::Version;
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Ordered set of versions to scan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionCatalog {
    versions: Vec<Version>,
}

impl VersionCatalog {
    /// Build a catalog from raw tag names
    ///
    /// Tags that are not plain releases (`v3.2.0.beta1`, `latest-release`)
    /// are ignored, as are releases older than `min_version`.
    ///
    /// ```
    /// use hookscope_engine::VersionCatalog;
    ///
    /// let catalog = VersionCatalog::from_tags(["v1.10.0", "v1.9.0", "1.9.0", "v2.0.0.beta1"], true, None);
    /// let names: Vec<String> = catalog.versions().iter().map(ToString::to_string).collect();
    /// assert_eq!(names, ["v1.9.0", "v1.10.0", "latest"]);
    /// ```
    pub fn from_tags<I, S>(tags: I, include_latest: bool, min_version: Option<&Version>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let releases: BTreeSet<Version> = tags
            .into_iter()
            .filter_map(|tag| Version::from_tag(tag.as_ref()))
            .filter(|version| min_version.is_none_or(|min| version >= min))
            .collect();

        let mut versions: Vec<Version> = releases.into_iter().collect();
        if include_latest {
            versions.push(Version::Latest);
        }
        Self { versions }
    }

    /// Build a catalog from explicit versions, deduplicated and ordered
    pub fn from_versions(versions: impl IntoIterator<Item = Version>) -> Self {
        let versions: BTreeSet<Version> = versions.into_iter().collect();
        Self {
            versions: versions.into_iter().collect(),
        }
    }

    /// Discover versions from the configured remote
    ///
    /// Discovery failures are not fatal: they are logged and produce an empty
    /// catalog, and the `latest` sentinel is not added on its own.
    pub fn fetch(source: &SourceConfig) -> Self {
        match list_remote_tags(&source.remote) {
            Ok(tags) => {
                debug!(remote = %source.remote, tags = tags.len(), "Listed remote tags");
                Self::from_tags(tags, source.include_latest, source.min_version.as_ref())
            }
            Err(e) => {
                warn!(remote = %source.remote, error = %e, "Failed to list versions");
                Self::default()
            }
        }
    }

    /// Keep only the newest `limit` releases (plus `latest`, if present)
    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        let has_latest = self.versions.last().is_some_and(Version::is_latest);
        let releases = self.versions.len() - usize::from(has_latest);
        if releases > limit {
            self.versions.drain(..releases - limit);
        }
        self
    }

    /// Versions in scan order
    pub fn versions(&self) -> &[Version] {
        &self.versions
    }

    /// Consume the catalog
    pub fn into_versions(self) -> Vec<Version> {
        self.versions
    }

    /// Number of versions, including `latest`
    pub fn len(&self) -> usize {
        self.versions.len()
    }

    /// Whether there is nothing to scan
    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_from_tags_orders_numerically() {
        let catalog = VersionCatalog::from_tags(["v2.0.0", "v1.10.0", "v1.2.0"], false, None);
        assert_eq!(
            catalog.versions(),
            &[
                Version::release(1, 2, 0),
                Version::release(1, 10, 0),
                Version::release(2, 0, 0)
            ]
        );
    }

    #[test]
    fn test_from_tags_drops_prereleases_and_junk() {
        let catalog = VersionCatalog::from_tags(
            [
                "v3.2.0.beta1",
                "latest-release",
                "refs/tags/v3.1.0",
                "v3.1",
                "beta",
            ],
            false,
            None,
        );
        assert_eq!(catalog.versions(), &[Version::release(3, 1, 0)]);
    }

    #[test]
    fn test_from_tags_appends_latest_once() {
        let catalog = VersionCatalog::from_tags(["v1.0.0", "latest"], true, None);
        assert_eq!(
            catalog.versions(),
            &[Version::release(1, 0, 0), Version::Latest]
        );
    }

    #[test]
    fn test_min_version_filter() {
        let min = Version::release(2, 0, 0);
        let catalog = VersionCatalog::from_tags(["v1.9.9", "v2.0.0", "v2.1.0"], false, Some(&min));
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.versions()[0], min);
    }

    #[test]
    fn test_limit_keeps_newest_and_latest() {
        let catalog =
            VersionCatalog::from_tags(["v1.0.0", "v1.1.0", "v1.2.0"], true, None).limit(2);
        assert_eq!(
            catalog.into_versions(),
            vec![
                Version::release(1, 1, 0),
                Version::release(1, 2, 0),
                Version::Latest
            ]
        );

        let unchanged = VersionCatalog::from_tags(["v1.0.0"], false, None).limit(5);
        assert_eq!(unchanged.len(), 1);
    }

    #[test]
    fn test_from_versions_dedupes_and_orders() {
        let catalog = VersionCatalog::from_versions([
            Version::Latest,
            Version::release(1, 1, 0),
            Version::release(1, 0, 0),
            Version::release(1, 1, 0),
        ]);
        assert_eq!(
            catalog.versions(),
            &[Version::release(1, 0, 0), Version::release(1, 1, 0), Version::Latest]
        );
    }

    #[test]
    fn test_empty_catalog() {
        let catalog = VersionCatalog::from_tags(Vec::<String>::new(), false, None);
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_fetch_fails_soft() {
        let source = SourceConfig {
            remote: "/nonexistent/hookscope/upstream.git".to_string(),
            ..SourceConfig::default()
        };
        let catalog = VersionCatalog::fetch(&source);
        assert!(catalog.is_empty());
    }
}
