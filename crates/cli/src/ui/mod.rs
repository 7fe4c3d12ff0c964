//! Terminal output for hookscope
//!
//! - Progress indicators for the catalog fetch and the version scan
//! - The coloured scan summary

pub mod progress;
pub mod summary;

pub use progress::{create_progress_bar, create_spinner};
pub use summary::{print_section_header, print_row, print_scan_summary};
