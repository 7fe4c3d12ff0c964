//! Hook extraction from a materialized snapshot
//!
//! The walk visits every eligible file in name order. Each file gets two
//! passes over the same matchers: a whole-file pass that follows constructs
//! across lines, then a per-line pass that records every construct complete
//! within a single line. Both passes emit occurrences; duplicates are folded
//! later by the scheduler, never suppressed here.

mod filter;
mod matchers;

pub use filter::FileFilter;
pub use matchers::{
    CallMatcher, HookMatcher, LegacyOutletMatcher, OutletTagMatcher, RawMatch, default_matchers,
};

use crate::syntax::LineIndex;
use hookscope_config::ScanConfig;
use hookscope_core::{HookOccurrence, HookType, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

/// Running counters for synthetic names of hooks whose name is not a literal
#[derive(Debug, Default)]
pub struct UnnamedCounter {
    next: BTreeMap<HookType, usize>,
}

impl UnnamedCounter {
    /// Next synthetic name for `hook_type`, e.g. `unnamed-app-event-trigger-1`
    pub fn next_name(&mut self, hook_type: HookType) -> String {
        let counter = self.next.entry(hook_type).or_insert(0);
        *counter += 1;
        format!("unnamed-{}-{}", hook_type.as_str(), counter)
    }
}

/// Extracts hook occurrences from source trees
pub struct Extractor {
    filter: FileFilter,
    matchers: Vec<Box<dyn HookMatcher>>,
}

impl Extractor {
    /// Create an extractor with the standard matchers
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            filter: FileFilter::new(config),
            matchers: default_matchers(),
        }
    }

    /// Extract every occurrence under `root`
    ///
    /// Unreadable and non-UTF-8 files are skipped. Paths in the result are
    /// relative to `root` and `/`-separated.
    pub fn extract(&self, root: &Path) -> Result<Vec<HookOccurrence>> {
        let mut occurrences = Vec::new();
        let mut unnamed = UnnamedCounter::default();
        let mut files = 0usize;

        let walker = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0
                    || !entry.file_type().is_dir()
                    || !entry
                        .file_name()
                        .to_str()
                        .is_some_and(|name| self.filter.excludes_dir(name))
            });

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    debug!(error = %e, "Skipping unreadable entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let Ok(relative) = entry.path().strip_prefix(root) else {
                continue;
            };
            if !self.filter.accepts(relative) {
                continue;
            }

            let source = match fs::read_to_string(entry.path()) {
                Ok(source) => source,
                Err(e) => {
                    debug!(path = %entry.path().display(), error = %e, "Skipping unreadable file");
                    continue;
                }
            };

            let file = relative
                .components()
                .filter_map(|c| c.as_os_str().to_str())
                .collect::<Vec<_>>()
                .join("/");

            files += 1;
            occurrences.extend(self.extract_source(&file, &source, &mut unnamed));
        }

        debug!(
            root = %root.display(),
            files,
            occurrences = occurrences.len(),
            "Extraction finished"
        );
        Ok(occurrences)
    }

    /// Extract occurrences from one file's contents
    pub fn extract_source(
        &self,
        file: &str,
        source: &str,
        unnamed: &mut UnnamedCounter,
    ) -> Vec<HookOccurrence> {
        let mut occurrences = Vec::new();
        let index = LineIndex::new(source);

        for matcher in &self.matchers {
            let hook_type = matcher.hook_type();
            for found in matcher.find_all(source) {
                let (first, last) = index.span(found.start, found.end);
                let name = if found.name.is_empty() {
                    unnamed.next_name(hook_type)
                } else {
                    found.name
                };
                occurrences.push(HookOccurrence::new(
                    name,
                    hook_type,
                    file,
                    first,
                    last,
                    found.arguments,
                ));
            }
        }

        // Per-line pass. Constructs that do not close on their line, or whose
        // name is not a literal, are already covered by the whole-file pass.
        for (line_number, line) in (1u32..).zip(source.lines()) {
            for matcher in &self.matchers {
                for found in matcher.find_all(line) {
                    if !found.complete || found.name.is_empty() {
                        continue;
                    }
                    occurrences.push(HookOccurrence::new(
                        found.name,
                        matcher.hook_type(),
                        file,
                        line_number,
                        line_number,
                        found.arguments,
                    ));
                }
            }
        }

        occurrences
    }
}
