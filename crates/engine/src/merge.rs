//! Cross-version hook index
//!
//! Every worker result is folded into one [`HookIndex`], single-threaded,
//! after all workers have finished. The index is built from ordered maps
//! throughout, so its content depends only on the set of results merged and
//! never on the order they arrived in.

use crate::scheduler::VersionScan;
use hookscope_core::{HookOccurrence, HookType, Version};
use indexmap::IndexMap;
use indexmap::map::Entry as IndexEntry;
use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

/// Fold occurrences of one version that share `(name, type, file)`
///
/// Line sets are unioned. Arguments of the first sighting are kept.
/// First-sighting order is preserved.
pub fn fold_occurrences(occurrences: Vec<HookOccurrence>) -> Vec<HookOccurrence> {
    let mut folded: IndexMap<(String, HookType, String), HookOccurrence> = IndexMap::new();

    for occurrence in occurrences {
        let key = (
            occurrence.name.clone(),
            occurrence.hook_type,
            occurrence.file.clone(),
        );
        match folded.entry(key) {
            IndexEntry::Occupied(mut entry) => entry.get_mut().lines.extend(occurrence.lines),
            IndexEntry::Vacant(entry) => {
                entry.insert(occurrence);
            }
        }
    }

    folded.into_values().collect()
}

/// Where a hook appears in one version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Version the hook was seen in
    pub version: Version,
    /// File path relative to the snapshot root
    pub file: String,
    /// Lines spanned, ascending and unique
    pub lines: BTreeSet<u32>,
    /// Normalized argument tokens
    pub arguments: Vec<String>,
}

/// Everything known about one hook across versions
#[derive(Debug, Clone)]
pub struct HookRecord {
    name: String,
    hook_type: HookType,
    locations: BTreeMap<(Version, String), Location>,
    raw_arguments: BTreeMap<Vec<String>, BTreeSet<Version>>,
}

impl HookRecord {
    fn new(name: &str, hook_type: HookType) -> Self {
        Self {
            name: name.to_string(),
            hook_type,
            locations: BTreeMap::new(),
            raw_arguments: BTreeMap::new(),
        }
    }

    /// Hook name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Hook kind
    pub fn hook_type(&self) -> HookType {
        self.hook_type
    }

    /// Locations ordered by version, then file
    pub fn locations(&self) -> impl Iterator<Item = &Location> {
        self.locations.values()
    }

    /// Earliest version with a location
    pub fn first_version(&self) -> Option<Version> {
        self.locations.keys().next().map(|(version, _)| *version)
    }

    /// Newest version with a location
    pub fn last_seen_version(&self) -> Option<Version> {
        self.locations.keys().next_back().map(|(version, _)| *version)
    }

    /// Distinct versions with at least one location
    pub fn versions(&self) -> BTreeSet<Version> {
        self.locations.keys().map(|(version, _)| *version).collect()
    }

    /// Whether the hook has a location at `version`
    pub fn seen_at(&self, version: Version) -> bool {
        self.locations
            .range((version, String::new())..)
            .next()
            .is_some_and(|((v, _), _)| *v == version)
    }

    /// Every distinct raw argument sequence observed at `version`
    ///
    /// Sequences come in a fixed (lexicographic) order.
    pub fn raw_arguments_at(&self, version: Version) -> impl Iterator<Item = &[String]> {
        self.raw_arguments
            .iter()
            .filter(move |(_, versions)| versions.contains(&version))
            .map(|(arguments, _)| arguments.as_slice())
    }

    fn absorb(&mut self, version: Version, occurrence: &HookOccurrence) {
        let tracks = self.hook_type.tracks_arguments();

        match self.locations.entry((version, occurrence.file.clone())) {
            Entry::Occupied(mut entry) => {
                let location = entry.get_mut();
                location.lines.extend(occurrence.lines.iter().copied());
                if self.hook_type.merges_location_arguments() {
                    for argument in &occurrence.arguments {
                        if !location.arguments.contains(argument) {
                            location.arguments.push(argument.clone());
                        }
                    }
                    location.arguments.sort();
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(Location {
                    version,
                    file: occurrence.file.clone(),
                    lines: occurrence.lines.clone(),
                    arguments: if tracks {
                        occurrence.arguments.clone()
                    } else {
                        Vec::new()
                    },
                });
            }
        }

        if tracks {
            self.raw_arguments
                .entry(occurrence.arguments.clone())
                .or_default()
                .insert(version);
        }
    }
}

/// All hooks across all merged versions, keyed by `(name, type)`
#[derive(Debug, Clone, Default)]
pub struct HookIndex {
    hooks: BTreeMap<(String, HookType), HookRecord>,
    scanned: BTreeSet<Version>,
    failed: BTreeSet<Version>,
}

impl HookIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from worker results, in any order
    pub fn from_scans<'a>(scans: impl IntoIterator<Item = &'a VersionScan>) -> Self {
        let mut index = Self::new();
        for scan in scans {
            index.merge_scan(scan);
        }
        index
    }

    /// Merge one worker result
    ///
    /// Failed versions are remembered but contribute no occurrences.
    pub fn merge_scan(&mut self, scan: &VersionScan) {
        if scan.succeeded() {
            self.scanned.insert(scan.version);
        } else {
            self.failed.insert(scan.version);
        }
        for occurrence in &scan.occurrences {
            self.merge_occurrence(scan.version, occurrence);
        }
    }

    /// Merge one occurrence seen at `version`
    pub fn merge_occurrence(&mut self, version: Version, occurrence: &HookOccurrence) {
        self.hooks
            .entry((occurrence.name.clone(), occurrence.hook_type))
            .or_insert_with(|| HookRecord::new(&occurrence.name, occurrence.hook_type))
            .absorb(version, occurrence);
    }

    /// Look up a hook
    pub fn get(&self, name: &str, hook_type: HookType) -> Option<&HookRecord> {
        self.hooks.get(&(name.to_string(), hook_type))
    }

    /// Hooks ordered by name, then type
    pub fn hooks(&self) -> impl Iterator<Item = &HookRecord> {
        self.hooks.values()
    }

    /// Number of hooks
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Whether no hook has been merged
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Versions whose scan completed, with or without occurrences
    pub fn scanned_versions(&self) -> &BTreeSet<Version> {
        &self.scanned
    }

    /// Versions whose scan failed
    pub fn failed_versions(&self) -> &BTreeSet<Version> {
        &self.failed
    }

    /// Newest version the index speaks for
    ///
    /// The newest successfully scanned version, so a version in which every
    /// hook disappeared still counts. Falls back to the newest location when
    /// no scan succeeded.
    pub fn latest_version(&self) -> Option<Version> {
        self.scanned
            .last()
            .copied()
            .or_else(|| self.hooks().filter_map(HookRecord::last_seen_version).max())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use std::time::Duration;

    fn occ(name: &str, hook_type: HookType, file: &str, line: u32, args: &[&str]) -> HookOccurrence {
        HookOccurrence::new(
            name,
            hook_type,
            file,
            line,
            line,
            args.iter().map(ToString::to_string).collect(),
        )
    }

    fn scan(version: &str, occurrences: Vec<HookOccurrence>) -> VersionScan {
        VersionScan {
            version: version.parse().unwrap(),
            occurrences,
            error: None,
            elapsed: Duration::ZERO,
        }
    }

    #[test]
    fn test_fold_unions_lines_and_keeps_first_arguments() {
        let folded = fold_occurrences(vec![
            occ("a", HookType::ValueTransformer, "x.js", 5, &["first"]),
            occ("b", HookType::ValueTransformer, "x.js", 1, &[]),
            occ("a", HookType::ValueTransformer, "x.js", 3, &["second"]),
            occ("a", HookType::ValueTransformer, "x.js", 5, &["third"]),
            occ("a", HookType::ValueTransformer, "y.js", 5, &[]),
        ]);

        assert_eq!(folded.len(), 3);
        assert_eq!(folded[0].name, "a");
        assert_eq!(folded[0].lines.iter().copied().collect::<Vec<_>>(), vec![3, 5]);
        assert_eq!(folded[0].arguments, vec!["first"]);
        assert_eq!(folded[1].name, "b");
        assert_eq!(folded[2].file, "y.js");
    }

    #[test]
    fn test_same_name_different_type_are_distinct_hooks() {
        let index = HookIndex::from_scans(&[scan(
            "v1.0.0",
            vec![
                occ("shared", HookType::ValueTransformer, "a.js", 1, &[]),
                occ("shared", HookType::BehaviorTransformer, "a.js", 2, &[]),
            ],
        )]);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_one_location_per_version_and_file() {
        let mut index = HookIndex::new();
        let v1 = Version::release(1, 0, 0);
        index.merge_occurrence(v1, &occ("o", HookType::PluginOutlet, "a.hbs", 4, &["topic"]));
        index.merge_occurrence(v1, &occ("o", HookType::PluginOutlet, "a.hbs", 2, &["model", "topic"]));
        index.merge_occurrence(v1, &occ("o", HookType::PluginOutlet, "b.hbs", 9, &[]));

        let hook = index.get("o", HookType::PluginOutlet).unwrap();
        let locations: Vec<_> = hook.locations().collect();
        assert_eq!(locations.len(), 2);
        assert_eq!(locations[0].lines.iter().copied().collect::<Vec<_>>(), vec![2, 4]);
        assert_eq!(locations[0].arguments, vec!["model", "topic"]);
    }

    #[test]
    fn test_value_transformer_location_keeps_first_arguments() {
        let mut index = HookIndex::new();
        let v1 = Version::release(1, 0, 0);
        index.merge_occurrence(v1, &occ("t", HookType::ValueTransformer, "a.js", 1, &["b", "a"]));
        index.merge_occurrence(v1, &occ("t", HookType::ValueTransformer, "a.js", 2, &["c"]));

        let hook = index.get("t", HookType::ValueTransformer).unwrap();
        assert_eq!(hook.locations().next().unwrap().arguments, vec!["b", "a"]);
        assert_eq!(hook.raw_arguments_at(v1).count(), 2);
    }

    #[test]
    fn test_behavior_transformer_records_no_arguments() {
        let mut index = HookIndex::new();
        let v1 = Version::release(1, 0, 0);
        index.merge_occurrence(v1, &occ("b", HookType::BehaviorTransformer, "a.js", 1, &["x"]));

        let hook = index.get("b", HookType::BehaviorTransformer).unwrap();
        assert!(hook.locations().next().unwrap().arguments.is_empty());
        assert_eq!(hook.raw_arguments_at(v1).count(), 0);
    }

    #[test]
    fn test_first_and_last_seen_versions() {
        let index = HookIndex::from_scans(&[
            scan("v2.0.0", vec![occ("h", HookType::AppEventTrigger, "z.js", 1, &[])]),
            scan("v1.0.0", vec![occ("h", HookType::AppEventTrigger, "a.js", 1, &[])]),
            scan("v3.0.0", vec![]),
        ]);

        let hook = index.get("h", HookType::AppEventTrigger).unwrap();
        assert_eq!(hook.first_version(), Some(Version::release(1, 0, 0)));
        assert_eq!(hook.last_seen_version(), Some(Version::release(2, 0, 0)));
        assert!(hook.seen_at(Version::release(2, 0, 0)));
        assert!(!hook.seen_at(Version::release(3, 0, 0)));
        assert_eq!(index.latest_version(), Some(Version::release(3, 0, 0)));
    }

    #[test]
    fn test_failed_scan_does_not_count_as_latest() {
        let mut failed = scan("v2.0.0", vec![]);
        failed.error = Some("fetch failed".to_string());
        let index = HookIndex::from_scans(&[
            scan("v1.0.0", vec![occ("h", HookType::PluginOutlet, "a.hbs", 1, &[])]),
            failed,
        ]);

        assert_eq!(index.latest_version(), Some(Version::release(1, 0, 0)));
        assert!(index.failed_versions().contains(&Version::release(2, 0, 0)));
    }

    #[test]
    fn test_merge_is_order_independent() {
        let scans = vec![
            scan(
                "v1.0.0",
                vec![
                    occ("o", HookType::PluginOutlet, "a.hbs", 1, &["topic"]),
                    occ("e", HookType::AppEventTrigger, "b.js", 3, &["x"]),
                ],
            ),
            scan(
                "v1.1.0",
                vec![
                    occ("o", HookType::PluginOutlet, "a.hbs", 2, &["model", "topic"]),
                    occ("o", HookType::PluginOutlet, "c.hbs", 7, &[]),
                ],
            ),
            scan("latest", vec![occ("e", HookType::AppEventTrigger, "b.js", 4, &["y"])]),
        ];

        let forward = HookIndex::from_scans(&scans);
        let backward = HookIndex::from_scans(scans.iter().rev());

        let snapshot = |index: &HookIndex| {
            index
                .hooks()
                .map(|h| {
                    (
                        h.name().to_string(),
                        h.hook_type(),
                        h.locations().cloned().collect::<Vec<_>>(),
                        h.versions()
                            .into_iter()
                            .map(|v| h.raw_arguments_at(v).map(<[String]>::to_vec).collect::<Vec<_>>())
                            .collect::<Vec<_>>(),
                    )
                })
                .collect::<Vec<_>>()
        };
        assert_eq!(snapshot(&forward), snapshot(&backward));
        assert_eq!(forward.latest_version(), backward.latest_version());
    }
}
