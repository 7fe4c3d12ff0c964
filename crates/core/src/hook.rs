//! Hook kinds and raw hook occurrences
//!
//! The scanned codebase exposes four kinds of extension points. Each kind has
//! its own matcher in the engine; this module only defines the shared data
//! carried between the extractor, the scheduler and the merger.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// The four kinds of extension points tracked across versions
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HookType {
    /// Declarative outlet placed in a template (`<PluginOutlet @name=...>`)
    PluginOutlet,
    /// A value passed through a named, overridable filter
    ValueTransformer,
    /// A named application event broadcast
    AppEventTrigger,
    /// A named operation wrapped for override, arguments untracked
    BehaviorTransformer,
}

impl HookType {
    /// All hook kinds in reporting order
    pub const ALL: [Self; 4] = [
        Self::PluginOutlet,
        Self::ValueTransformer,
        Self::AppEventTrigger,
        Self::BehaviorTransformer,
    ];

    /// Stable identifier used in the JSON artifact
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PluginOutlet => "plugin-outlet",
            Self::ValueTransformer => "value-transformer",
            Self::AppEventTrigger => "app-event-trigger",
            Self::BehaviorTransformer => "behavior-transformer",
        }
    }

    /// Whether argument signatures are recorded and consolidated for this kind
    ///
    /// Behavior transformer call sites are treated as untyped.
    #[must_use]
    pub const fn tracks_arguments(&self) -> bool {
        !matches!(self, Self::BehaviorTransformer)
    }

    /// Whether arguments seen again at an existing location are unioned into it
    ///
    /// Outlet argument bags are key sets and event payloads vary between call
    /// sites in one file, so both accumulate. Value transformers keep the
    /// arguments of their first sighting.
    #[must_use]
    pub const fn merges_location_arguments(&self) -> bool {
        matches!(self, Self::PluginOutlet | Self::AppEventTrigger)
    }
}

impl fmt::Display for HookType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One hook sighting produced by the extractor
///
/// Line numbers are 1-based and kept sorted without duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookOccurrence {
    /// Declared hook name (or a synthetic `unnamed-*` name)
    pub name: String,
    /// Kind of hook
    #[serde(rename = "type")]
    pub hook_type: HookType,
    /// Path relative to the snapshot root, `/`-separated
    pub file: String,
    /// Lines spanned by the construct
    pub lines: BTreeSet<u32>,
    /// Normalized argument tokens
    pub arguments: Vec<String>,
}

impl HookOccurrence {
    /// Create an occurrence spanning `first_line..=last_line`
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        hook_type: HookType,
        file: impl Into<String>,
        first_line: u32,
        last_line: u32,
        arguments: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            hook_type,
            file: file.into(),
            lines: (first_line..=last_line.max(first_line)).collect(),
            arguments,
        }
    }

    /// First line of the construct
    #[must_use]
    pub fn first_line(&self) -> Option<u32> {
        self.lines.first().copied()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_hook_type_serializes_kebab_case() {
        let json = serde_json::to_string(&HookType::AppEventTrigger).unwrap();
        assert_eq!(json, "\"app-event-trigger\"");
        for kind in HookType::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }

    #[test]
    fn test_argument_tracking_by_kind() {
        assert!(HookType::PluginOutlet.tracks_arguments());
        assert!(HookType::ValueTransformer.tracks_arguments());
        assert!(HookType::AppEventTrigger.tracks_arguments());
        assert!(!HookType::BehaviorTransformer.tracks_arguments());

        assert!(HookType::PluginOutlet.merges_location_arguments());
        assert!(!HookType::ValueTransformer.merges_location_arguments());
        assert!(!HookType::BehaviorTransformer.merges_location_arguments());
    }

    #[test]
    fn test_occurrence_line_span() {
        let occ = HookOccurrence::new("x", HookType::PluginOutlet, "a.hbs", 4, 6, vec![]);
        assert_eq!(occ.lines.into_iter().collect::<Vec<_>>(), vec![4, 5, 6]);

        let single = HookOccurrence::new("x", HookType::PluginOutlet, "a.hbs", 9, 9, vec![]);
        assert_eq!(single.first_line(), Some(9));
        assert_eq!(single.lines.len(), 1);
    }

    #[test]
    fn test_occurrence_json_shape() {
        let occ = HookOccurrence::new(
            "topic-footer",
            HookType::PluginOutlet,
            "app/topic.hbs",
            3,
            3,
            vec!["topic".to_string()],
        );
        let json = serde_json::to_value(&occ).unwrap();
        assert_eq!(json["type"], "plugin-outlet");
        assert_eq!(json["lines"], serde_json::json!([3]));
    }
}
