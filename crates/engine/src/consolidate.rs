//! Per-version argument signatures
//!
//! A hook may be called from several places in one version, each with its
//! own raw argument tokens. Those are collapsed into one signature per
//! version by picking a display name for every argument position, and
//! versions that share a signature are grouped into one history entry.

use crate::merge::HookRecord;
use crate::normalize::{VALUE_TOKEN, is_identifier};
use hookscope_core::Version;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

/// Tokens that describe a literal's kind rather than name an argument
pub const RESERVED_TOKENS: [&str; 7] = [
    "string", "number", "boolean", "null", "array", "object", "this",
];

static METHOD_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\.\s*([A-Za-z_$][\w$]*)\s*\(").expect("Failed to compile method call pattern")
});

static TRAILING_MEMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\.\s*([A-Za-z_$][\w$]*)\s*$").expect("Failed to compile member pattern")
});

/// One distinct signature and the versions it was observed in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArgumentSignatureEntry {
    /// Display name of each argument position
    pub argument_signature: Vec<String>,
    /// Earliest version in `versions`
    pub first_seen_version: Version,
    /// Versions whose consolidated signature is exactly this one
    pub versions: BTreeSet<Version>,
    /// Signature changes that precede this entry
    pub change_count: usize,
}

/// Name from a method call (`a.foo()` gives `foo`) or a trailing member (`a.foo`)
fn member_name(token: &str) -> Option<&str> {
    METHOD_CALL
        .captures_iter(token)
        .last()
        .or_else(|| TRAILING_MEMBER.captures(token))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Pick the display name for one argument position
///
/// Priority: a plain identifier that is not a reserved token, then a
/// method or member name, then [`VALUE_TOKEN`]. Within a priority the first
/// candidate wins.
pub fn display_name<'a>(candidates: impl IntoIterator<Item = &'a str> + Clone) -> String {
    if let Some(identifier) = candidates
        .clone()
        .into_iter()
        .find(|token| is_identifier(token) && !RESERVED_TOKENS.contains(token))
    {
        return identifier.to_string();
    }

    candidates
        .into_iter()
        .find_map(member_name)
        .unwrap_or(VALUE_TOKEN)
        .to_string()
}

/// Consolidate the argument sequences seen at one version into one signature
pub fn consolidate_signature(sequences: &[&[String]]) -> Vec<String> {
    let width = sequences.iter().map(|s| s.len()).max().unwrap_or(0);

    (0..width)
        .map(|position| {
            display_name(
                sequences
                    .iter()
                    .filter_map(move |sequence| sequence.get(position).map(String::as_str)),
            )
        })
        .collect()
}

/// Signature history of a hook, ordered by first appearance
///
/// Hook kinds that do not track arguments have no history.
pub fn argument_history(hook: &HookRecord) -> Vec<ArgumentSignatureEntry> {
    if !hook.hook_type().tracks_arguments() {
        return Vec::new();
    }

    let mut groups: BTreeMap<Vec<String>, BTreeSet<Version>> = BTreeMap::new();
    for version in hook.versions() {
        let sequences: Vec<&[String]> = hook.raw_arguments_at(version).collect();
        groups
            .entry(consolidate_signature(&sequences))
            .or_default()
            .insert(version);
    }

    let mut entries: Vec<ArgumentSignatureEntry> = groups
        .into_iter()
        .filter_map(|(signature, versions)| {
            let first_seen_version = *versions.first()?;
            Some(ArgumentSignatureEntry {
                argument_signature: signature,
                first_seen_version,
                versions,
                change_count: 0,
            })
        })
        .collect();

    entries.sort_by_key(|entry| entry.first_seen_version);
    for (index, entry) in entries.iter_mut().enumerate() {
        entry.change_count = index;
    }
    entries
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use crate::merge::HookIndex;
    use hookscope_core::{HookOccurrence, HookType};

    fn seq(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(ToString::to_string).collect()
    }

    fn call(name: &str, file: &str, args: &[&str]) -> HookOccurrence {
        HookOccurrence::new(name, HookType::ValueTransformer, file, 1, 1, seq(args))
    }

    #[test]
    fn test_display_name_priorities() {
        assert_eq!(display_name(["string", "topic"]), "topic");
        assert_eq!(display_name(["this", "string"]), VALUE_TOKEN);
        assert_eq!(display_name(["this.currentUser"]), "currentUser");
        assert_eq!(display_name(["this.get(\"x\")"]), "get");
        assert_eq!(display_name(["this.model.posts.filter(p => p.ok).length"]), "filter");
        assert_eq!(display_name(["this.topic", "post"]), "post");
        assert_eq!(display_name(["{a,b}", "number"]), VALUE_TOKEN);
        assert_eq!(display_name(Vec::<&str>::new()), VALUE_TOKEN);
    }

    #[test]
    fn test_signature_takes_longest_sequence() {
        let a = seq(&["topic", "user"]);
        let b = seq(&["topic"]);
        assert_eq!(consolidate_signature(&[a.as_slice(), b.as_slice()]), vec!["topic", "user"]);
        assert!(consolidate_signature(&[]).is_empty());
    }

    #[test]
    fn test_signature_ignores_inline_comments() {
        use crate::extract::{Extractor, UnnamedCounter};
        use hookscope_config::ScanConfig;

        let source = "applyValueTransformer(\n  \"card-title\",\n  topic, // the topic\n  user /* who */\n);\n";
        let found = Extractor::new(&ScanConfig::default()).extract_source(
            "app/card.js",
            source,
            &mut UnnamedCounter::default(),
        );

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "card-title");
        assert_eq!(found[0].arguments, vec!["topic", "user"]);
        assert_eq!(
            consolidate_signature(&[found[0].arguments.as_slice()]),
            vec!["topic", "user"]
        );
    }

    #[test]
    fn test_history_groups_versions_by_signature() {
        let v1 = Version::release(1, 0, 0);
        let v2 = Version::release(2, 0, 0);
        let v3 = Version::release(3, 0, 0);

        let mut index = HookIndex::new();
        index.merge_occurrence(v1, &call("x", "a.js", &["topic", "user"]));
        index.merge_occurrence(v1, &call("x", "b.js", &["topic"]));
        index.merge_occurrence(v2, &call("x", "a.js", &["topic", "currentUser"]));
        index.merge_occurrence(v3, &call("x", "a.js", &["topic", "user"]));

        let history = argument_history(index.get("x", HookType::ValueTransformer).unwrap());
        assert_eq!(history.len(), 2);

        assert_eq!(history[0].argument_signature, vec!["topic", "user"]);
        assert_eq!(history[0].first_seen_version, v1);
        assert_eq!(history[0].versions, BTreeSet::from([v1, v3]));
        assert_eq!(history[0].change_count, 0);

        assert_eq!(history[1].argument_signature, vec!["topic", "currentUser"]);
        assert_eq!(history[1].first_seen_version, v2);
        assert_eq!(history[1].change_count, 1);
    }

    #[test]
    fn test_versions_partition_across_entries() {
        let mut index = HookIndex::new();
        for (major, args) in [(1, vec!["a"]), (2, vec!["a", "b"]), (3, vec!["a"]), (4, vec![])] {
            index.merge_occurrence(Version::release(major, 0, 0), &call("p", "f.js", &args));
        }

        let hook = index.get("p", HookType::ValueTransformer).unwrap();
        let history = argument_history(hook);
        let mut seen = BTreeSet::new();
        for entry in &history {
            for version in &entry.versions {
                assert!(seen.insert(*version), "{version} appears twice");
            }
        }
        assert_eq!(seen, hook.versions());
    }

    #[test]
    fn test_behavior_transformer_has_no_history() {
        let mut index = HookIndex::new();
        index.merge_occurrence(
            Version::release(1, 0, 0),
            &HookOccurrence::new("b", HookType::BehaviorTransformer, "a.js", 1, 1, vec![]),
        );
        let hook = index.get("b", HookType::BehaviorTransformer).unwrap();
        assert!(argument_history(hook).is_empty());
    }
}
