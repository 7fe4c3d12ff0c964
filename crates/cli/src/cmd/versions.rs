//! Versions command implementation
//!
//! Prints the catalog that `scan` would use.

use clap::Args;
use hookscope_engine::{Version, VersionCatalog};
use owo_colors::OwoColorize;

use crate::command::Command;
use crate::common::RuntimeContext;
use crate::error::{CommandError, Result};

/// Versions command
#[derive(Debug, Args)]
pub struct VersionsCommand {
    /// Only list the newest N releases (latest is always kept)
    #[arg(long, value_name = "N")]
    pub limit: Option<usize>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

impl Command for VersionsCommand {
    type Output = Vec<Version>;

    fn execute(&self, context: &RuntimeContext) -> Result<Vec<Version>> {
        let catalog = VersionCatalog::fetch(&context.config.source);
        let catalog = match self.limit {
            Some(limit) => catalog.limit(limit),
            None => catalog,
        };
        if catalog.is_empty() {
            return Err(CommandError::NoVersions);
        }
        let versions = catalog.into_versions();

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&versions).map_err(anyhow::Error::from)?
            );
        } else {
            for version in &versions {
                if version.is_latest() {
                    println!(
                        "{} {}",
                        version.bright_cyan(),
                        format!("({})", context.config.source.latest_ref).dimmed()
                    );
                } else {
                    println!("{version}");
                }
            }
            println!(
                "{}",
                format!("{} versions from {}", versions.len(), context.config.source.remote)
                    .dimmed()
            );
        }

        Ok(versions)
    }
}
