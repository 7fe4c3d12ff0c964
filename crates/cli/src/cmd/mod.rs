//! CLI command implementations

pub mod extract;
pub mod info;
pub mod scan;
pub mod versions;
