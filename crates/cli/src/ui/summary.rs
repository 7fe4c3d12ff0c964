//! Coloured scan summary

use hookscope_engine::{HookType, Report, Version};
use owo_colors::OwoColorize;
use std::path::Path;

/// Print a bold section header
pub fn print_section_header(name: &str) {
    println!("{}", name.bright_white().bold());
}

/// Print a single row with a status indicator
pub fn print_row(label: &str, value: &str, ok: bool, note: Option<&str>) {
    let symbol = if ok {
        "✓".bright_green().to_string()
    } else if note.is_some() {
        "✗".bright_red().to_string()
    } else {
        "⚠".yellow().to_string()
    };

    let formatted_value = if ok {
        value.bright_white().to_string()
    } else {
        value.dimmed().to_string()
    };

    if let Some(note_text) = note {
        println!(
            "  {} {:14} {} {}",
            symbol,
            label,
            formatted_value,
            format!("({note_text})").dimmed()
        );
    } else {
        println!("  {symbol} {label:14} {formatted_value}");
    }
}

fn type_breakdown(counts: &std::collections::BTreeMap<HookType, usize>) -> String {
    counts
        .iter()
        .filter(|(_, count)| **count > 0)
        .map(|(hook_type, count)| format!("{count} {hook_type}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Print the outcome of a scan
///
/// `failed` lists versions that contributed nothing; `output` is where the
/// artifact was written.
pub fn print_scan_summary(report: &Report, scanned: usize, failed: &[Version], output: &Path) {
    println!();
    if failed.is_empty() {
        println!(
            "{} {} versions scanned",
            "●".bright_green(),
            scanned.to_string().bright_green().bold()
        );
    } else {
        println!(
            "{} {} | {} {}",
            "●".bright_green(),
            scanned.saturating_sub(failed.len()).to_string().bright_green().bold(),
            "●".bright_red(),
            failed.len().to_string().bright_red().bold(),
        );
        let names: Vec<String> = failed.iter().map(ToString::to_string).collect();
        println!("  {}", format!("failed: {}", names.join(", ")).dimmed());
    }
    println!();

    print_section_header("Hooks");
    print_row("Total", &report.total_hooks.to_string(), true, None);
    let breakdown = type_breakdown(&report.hooks_by_type);
    if !breakdown.is_empty() {
        println!("  {:16} {}", "", breakdown.dimmed());
    }
    if let Some(latest) = report.latest_version {
        print_row(
            "In latest",
            &report.hooks_in_latest_version.to_string(),
            true,
            Some(&latest.to_string()),
        );
    }
    print_row(
        "Retired",
        &report.retired_hooks.to_string(),
        report.retired_hooks == 0,
        None,
    );
    print_row(
        "Changed args",
        &report.hooks_with_argument_changes.to_string(),
        true,
        None,
    );
    println!();

    if !report.summary.hooks_with_most_changes.is_empty() {
        print_section_header("Most changed");
        for hook in &report.summary.hooks_with_most_changes {
            println!(
                "  {:>3}  {} {}",
                hook.argument_change_count.to_string().yellow(),
                hook.name.bright_white(),
                format!("({})", hook.hook_type).dimmed()
            );
        }
        println!();
    }

    if !report.summary.retired_hooks_list.is_empty() {
        print_section_header("Recently retired");
        for hook in &report.summary.retired_hooks_list {
            println!(
                "  {:>8}  {} {}",
                hook.last_seen_version.to_string().red(),
                hook.name.bright_white(),
                format!("({})", hook.hook_type).dimmed()
            );
        }
        println!();
    }

    println!("{} {}", "Report written to".dimmed(), output.display());
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_type_breakdown_skips_empty_kinds() {
        let counts = BTreeMap::from([
            (HookType::PluginOutlet, 3),
            (HookType::ValueTransformer, 0),
            (HookType::AppEventTrigger, 1),
        ]);
        assert_eq!(type_breakdown(&counts), "3 plugin-outlet, 1 app-event-trigger");
    }
}
