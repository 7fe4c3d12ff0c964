//! Which files in a snapshot are scanned

use hookscope_config::ScanConfig;
use std::collections::HashSet;
use std::path::Path;

/// File selection derived from `[scan]` configuration
///
/// A file is scanned when its extension is allow-listed, no directory on its
/// path is excluded, and its name carries none of the test markers.
#[derive(Debug, Clone)]
pub struct FileFilter {
    extensions: HashSet<String>,
    exclude_dirs: HashSet<String>,
    exclude_file_markers: Vec<String>,
}

impl FileFilter {
    /// Build a filter from scan configuration
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            extensions: config
                .extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
            exclude_dirs: config.exclude_dirs.iter().cloned().collect(),
            exclude_file_markers: config.exclude_file_markers.clone(),
        }
    }

    /// Whether a directory with this name is pruned from the walk
    pub fn excludes_dir(&self, name: &str) -> bool {
        self.exclude_dirs.contains(name)
    }

    /// Whether the file at `relative` (relative to the snapshot root) is scanned
    pub fn accepts(&self, relative: &Path) -> bool {
        let Some(file_name) = relative.file_name().and_then(|n| n.to_str()) else {
            return false;
        };

        let has_extension = relative
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.contains(&ext.to_ascii_lowercase()));
        if !has_extension {
            return false;
        }

        if self
            .exclude_file_markers
            .iter()
            .any(|marker| file_name.contains(marker.as_str()))
        {
            return false;
        }

        // Parent components are checked too, for callers that do not prune
        !relative
            .parent()
            .into_iter()
            .flat_map(Path::components)
            .filter_map(|c| c.as_os_str().to_str())
            .any(|component| self.excludes_dir(component))
    }
}
