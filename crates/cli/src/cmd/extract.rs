//! Extract command implementation
//!
//! Runs the extractor over one directory, without git or merging. Useful for
//! checking what a snapshot yields and where synthetic names come from.

use clap::Args;
use hookscope_core::HookOccurrence;
use hookscope_engine::Extractor;
use hookscope_engine::merge::fold_occurrences;
use owo_colors::OwoColorize;
use std::path::PathBuf;

use crate::command::Command;
use crate::common::RuntimeContext;
use crate::error::{CommandError, Result};

/// Extract command
#[derive(Debug, Args)]
pub struct ExtractCommand {
    /// Directory to scan
    #[arg(value_name = "DIR")]
    pub dir: PathBuf,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

impl Command for ExtractCommand {
    type Output = Vec<HookOccurrence>;

    fn execute(&self, context: &RuntimeContext) -> Result<Vec<HookOccurrence>> {
        if !self.dir.is_dir() {
            return Err(CommandError::DirectoryNotFound(self.dir.clone()));
        }

        let extractor = Extractor::new(&context.config.scan);
        let occurrences = fold_occurrences(extractor.extract(&self.dir)?);

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&occurrences).map_err(anyhow::Error::from)?
            );
        } else {
            display_table(&occurrences);
        }

        Ok(occurrences)
    }
}

fn format_lines(occurrence: &HookOccurrence) -> String {
    match (occurrence.lines.first(), occurrence.lines.last()) {
        (Some(first), Some(last)) if first != last => format!("{first}-{last}"),
        (Some(first), _) => first.to_string(),
        _ => String::new(),
    }
}

fn display_table(occurrences: &[HookOccurrence]) {
    for occurrence in occurrences {
        let name = if occurrence.name.starts_with("unnamed-") {
            occurrence.name.yellow().to_string()
        } else {
            occurrence.name.bright_white().to_string()
        };
        println!(
            "{:22} {} {}",
            occurrence.hook_type.to_string().cyan(),
            name,
            format!("{}:{}", occurrence.file, format_lines(occurrence)).dimmed()
        );
        if !occurrence.arguments.is_empty() {
            println!("{:22} {}", "", occurrence.arguments.join(", ").dimmed());
        }
    }
    println!(
        "{}",
        format!("{} occurrences", occurrences.len()).dimmed()
    );
}
