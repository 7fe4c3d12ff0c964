//! The JSON artifact
//!
//! [`Report::assemble`] is a pure function of the merged index and a
//! timestamp; [`write_report`] is the only I/O.

use crate::consolidate::{ArgumentSignatureEntry, argument_history};
use crate::merge::{HookIndex, HookRecord, Location};
use chrono::{DateTime, Utc};
use hookscope_core::{HookType, Result, Version};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::info;

/// One hook in the artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HookEntry {
    /// Hook name
    pub name: String,
    /// Hook kind
    #[serde(rename = "type")]
    pub hook_type: HookType,
    /// Earliest version with a location
    pub first_version: Version,
    /// Newest version with a location
    pub last_seen_version: Version,
    /// Every location, ordered by version then file
    pub locations: Vec<Location>,
    /// Signature history, ordered by first appearance
    pub argument_history: Vec<ArgumentSignatureEntry>,
    /// More than one signature was observed
    pub has_argument_changes: bool,
    /// Number of signature changes
    pub argument_change_count: usize,
}

impl HookEntry {
    fn from_record(record: &HookRecord) -> Option<Self> {
        let first_version = record.first_version()?;
        let last_seen_version = record.last_seen_version()?;
        let argument_history = argument_history(record);
        let argument_change_count = argument_history.len().saturating_sub(1);

        Some(Self {
            name: record.name().to_string(),
            hook_type: record.hook_type(),
            first_version,
            last_seen_version,
            locations: record.locations().cloned().collect(),
            argument_history,
            has_argument_changes: argument_change_count > 0,
            argument_change_count,
        })
    }
}

/// A hook ranked by how often its signature changed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangedHook {
    /// Hook name
    pub name: String,
    /// Hook kind
    #[serde(rename = "type")]
    pub hook_type: HookType,
    /// Number of signature changes
    pub argument_change_count: usize,
}

/// A hook absent from the latest version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetiredHook {
    /// Hook name
    pub name: String,
    /// Hook kind
    #[serde(rename = "type")]
    pub hook_type: HookType,
    /// Newest version the hook was seen in
    pub last_seen_version: Version,
}

/// Short lists for the dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// Sum of every hook's change count
    pub total_argument_changes: usize,
    /// Most-changed hooks, most changes first
    pub hooks_with_most_changes: Vec<ChangedHook>,
    /// Most recently retired hooks first
    pub retired_hooks_list: Vec<RetiredHook>,
}

/// The complete artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Number of distinct hooks
    pub total_hooks: usize,
    /// Hook count per kind, every kind present
    pub hooks_by_type: BTreeMap<HookType, usize>,
    /// Hooks with more than one signature
    pub hooks_with_argument_changes: usize,
    /// Newest version covered
    pub latest_version: Option<Version>,
    /// Hooks present in the latest version
    pub hooks_in_latest_version: usize,
    /// Per-kind counts restricted to the latest version
    pub latest_version_hooks_by_type: BTreeMap<HookType, usize>,
    /// Hooks absent from the latest version
    pub retired_hooks: usize,
    /// When the report was assembled
    pub last_updated: DateTime<Utc>,
    /// Every hook, ordered by name then kind
    pub hooks: Vec<HookEntry>,
    /// Short lists
    pub summary: Summary,
}

fn count_by_type<'a>(hooks: impl Iterator<Item = &'a HookEntry>) -> BTreeMap<HookType, usize> {
    let mut counts: BTreeMap<HookType, usize> = HookType::ALL.iter().map(|t| (*t, 0)).collect();
    for hook in hooks {
        *counts.entry(hook.hook_type).or_default() += 1;
    }
    counts
}

impl Report {
    /// Derive the report from a merged index
    ///
    /// `top_n` bounds both summary lists.
    pub fn assemble(index: &HookIndex, top_n: usize, last_updated: DateTime<Utc>) -> Self {
        let hooks: Vec<HookEntry> = index.hooks().filter_map(HookEntry::from_record).collect();
        let latest_version = index.latest_version();

        let in_latest = |hook: &HookEntry| {
            latest_version.is_some_and(|latest| {
                index
                    .get(&hook.name, hook.hook_type)
                    .is_some_and(|record| record.seen_at(latest))
            })
        };

        let latest_hooks: Vec<&HookEntry> = hooks.iter().filter(|h| in_latest(*h)).collect();
        let hooks_in_latest_version = latest_hooks.len();
        let latest_version_hooks_by_type = count_by_type(latest_hooks.into_iter());

        let mut retired: Vec<RetiredHook> = hooks
            .iter()
            .filter(|h| latest_version.is_some() && !in_latest(*h))
            .map(|h| RetiredHook {
                name: h.name.clone(),
                hook_type: h.hook_type,
                last_seen_version: h.last_seen_version,
            })
            .collect();
        let retired_hooks = retired.len();
        retired.sort_by(|a, b| {
            b.last_seen_version
                .cmp(&a.last_seen_version)
                .then_with(|| a.name.cmp(&b.name))
        });
        retired.truncate(top_n);

        let mut changed: Vec<ChangedHook> = hooks
            .iter()
            .filter(|h| h.argument_change_count > 0)
            .map(|h| ChangedHook {
                name: h.name.clone(),
                hook_type: h.hook_type,
                argument_change_count: h.argument_change_count,
            })
            .collect();
        let hooks_with_argument_changes = changed.len();
        changed.sort_by(|a, b| {
            b.argument_change_count
                .cmp(&a.argument_change_count)
                .then_with(|| a.name.cmp(&b.name))
        });
        changed.truncate(top_n);

        let total_argument_changes = hooks.iter().map(|h| h.argument_change_count).sum();

        Self {
            total_hooks: hooks.len(),
            hooks_by_type: count_by_type(hooks.iter()),
            hooks_with_argument_changes,
            latest_version,
            hooks_in_latest_version,
            latest_version_hooks_by_type,
            retired_hooks,
            last_updated,
            summary: Summary {
                total_argument_changes,
                hooks_with_most_changes: changed,
                retired_hooks_list: retired,
            },
            hooks,
        }
    }
}

/// Write the report as pretty JSON, replacing `path` atomically
///
/// The parent directory is created if needed.
pub fn write_report(report: &Report, path: &Path) -> Result<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent)?;

    let mut file = NamedTempFile::new_in(parent)?;
    serde_json::to_writer_pretty(&mut file, report)?;
    file.write_all(b"\n")?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| e.error)?;

    info!(path = %path.display(), hooks = report.total_hooks, "Report written");
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use crate::scheduler::VersionScan;
    use hookscope_core::HookOccurrence;
    use std::time::Duration;
    use tempfile::TempDir;

    fn occ(name: &str, hook_type: HookType, args: &[&str]) -> HookOccurrence {
        HookOccurrence::new(
            name,
            hook_type,
            "app/file.js",
            1,
            1,
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

    fn timestamp() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn sample_index() -> HookIndex {
        let scans: Vec<VersionScan> = (1..=5)
            .map(|minor| {
                let args: &[&str] = if minor < 3 { &["topic"] } else { &["topic", "user"] };
                let occurrences = vec![
                    occ("old-outlet", HookType::PluginOutlet, &[]),
                    occ("changing", HookType::ValueTransformer, args),
                ];
                scan(&format!("v1.{minor}.0"), occurrences)
            })
            .chain(std::iter::once(scan(
                "v1.6.0",
                vec![
                    occ("changing", HookType::ValueTransformer, &["post"]),
                    occ("new-event", HookType::AppEventTrigger, &[]),
                ],
            )))
            .collect();
        HookIndex::from_scans(&scans)
    }

    #[test]
    fn test_retirement_and_latest_counts() {
        let report = Report::assemble(&sample_index(), 10, timestamp());

        assert_eq!(report.total_hooks, 3);
        assert_eq!(report.latest_version, Some(Version::release(1, 6, 0)));
        assert_eq!(report.hooks_in_latest_version, 2);
        assert_eq!(report.retired_hooks, 1);
        assert_eq!(report.summary.retired_hooks_list.len(), 1);
        let retired = &report.summary.retired_hooks_list[0];
        assert_eq!(retired.name, "old-outlet");
        assert_eq!(retired.last_seen_version, Version::release(1, 5, 0));

        assert_eq!(report.hooks_by_type.len(), HookType::ALL.len());
        assert_eq!(report.hooks_by_type[&HookType::PluginOutlet], 1);
        assert_eq!(report.latest_version_hooks_by_type[&HookType::PluginOutlet], 0);
        assert_eq!(report.latest_version_hooks_by_type[&HookType::AppEventTrigger], 1);
    }

    #[test]
    fn test_argument_change_summary() {
        let report = Report::assemble(&sample_index(), 10, timestamp());

        let changing = report.hooks.iter().find(|h| h.name == "changing").unwrap();
        assert_eq!(changing.argument_change_count, 2);
        assert!(changing.has_argument_changes);
        assert_eq!(changing.argument_history.len(), 3);
        assert_eq!(changing.first_version, Version::release(1, 1, 0));

        assert_eq!(report.hooks_with_argument_changes, 1);
        assert_eq!(report.summary.total_argument_changes, 2);
        assert_eq!(report.summary.hooks_with_most_changes[0].name, "changing");
    }

    #[test]
    fn test_top_n_bounds_summary_lists() {
        let scans = vec![
            scan(
                "v1.0.0",
                (0..5)
                    .map(|i| occ(&format!("gone-{i}"), HookType::PluginOutlet, &[]))
                    .collect(),
            ),
            scan("v2.0.0", vec![]),
        ];
        let report = Report::assemble(&HookIndex::from_scans(&scans), 3, timestamp());
        assert_eq!(report.retired_hooks, 5);
        assert_eq!(report.summary.retired_hooks_list.len(), 3);
        assert_eq!(report.summary.retired_hooks_list[0].name, "gone-0");
    }

    #[test]
    fn test_empty_index() {
        let report = Report::assemble(&HookIndex::new(), 10, timestamp());
        assert_eq!(report.total_hooks, 0);
        assert_eq!(report.latest_version, None);
        assert_eq!(report.retired_hooks, 0);
        assert!(report.hooks_by_type.values().all(|count| *count == 0));
    }

    #[test]
    fn test_json_field_names() {
        let report = Report::assemble(&sample_index(), 10, timestamp());
        let json = serde_json::to_value(&report).unwrap();

        for field in [
            "totalHooks",
            "hooksByType",
            "hooksWithArgumentChanges",
            "latestVersion",
            "hooksInLatestVersion",
            "latestVersionHooksByType",
            "retiredHooks",
            "lastUpdated",
            "hooks",
            "summary",
        ] {
            assert!(json.get(field).is_some(), "missing {field}");
        }
        assert_eq!(json["latestVersion"], "v1.6.0");
        assert_eq!(json["hooksByType"]["plugin-outlet"], 1);
        assert_eq!(json["hooks"][0]["type"], "value-transformer");
        assert!(json["hooks"][0]["argumentHistory"].is_array());
        assert!(json["hooks"][0]["argumentHistory"][0]["changeCount"].is_number());
        assert!(json["summary"]["retiredHooksList"].is_array());
    }

    #[test]
    fn test_write_report_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out/nested/hooks.json");
        let report = Report::assemble(&sample_index(), 10, timestamp());

        write_report(&report, &path).unwrap();
        write_report(&report, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let parsed: Report = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, report);
        let leftovers = std::fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(leftovers, 1);
    }
}
