//! Progress bar utilities
//!
//! This module provides progress bar helpers using indicatif.

use indicatif::{ProgressBar, ProgressStyle};

/// Create a progress bar counting finished versions
///
/// `label` stays fixed; the message slot shows the last finished item.
pub fn create_progress_bar(total: u64, label: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{prefix} [{bar:40.cyan/blue}] {pos}/{len} ({elapsed}) {msg:.dim}")
            .expect("progress bar template is valid")
            .progress_chars("#>-"),
    );
    pb.set_prefix(label.to_string());
    pb
}

/// Create a spinner for indeterminate operations
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner} {msg}")
            .expect("spinner template is valid"),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
