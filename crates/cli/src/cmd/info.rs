//! Info command implementation
//!
//! Display build information and the paths hookscope will use.

use clap::Args;
use hookscope_config::Config;
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::debug;

use crate::command::Command;
use crate::common::RuntimeContext;
use crate::error::Result;
use crate::ui::{print_row, print_section_header};

const NOT_FOUND: &str = "not found";
const UNKNOWN: &str = "unknown";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InfoData {
    hookscope: HookscopeInfo,
    build: BuildInfo,
    paths: PathsInfo,
    source: SourceInfo,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HookscopeInfo {
    version: String,
    config: String,
    config_exists: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BuildInfo {
    rustc: String,
    timestamp: Option<String>,
    git_sha: Option<String>,
    commit_date: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PathsInfo {
    cache: String,
    mirror: String,
    snapshots: String,
    output: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SourceInfo {
    remote: String,
    latest_ref: String,
    directories: Vec<String>,
    max_workers: usize,
    fetch_depth: u32,
}

/// Info command
#[derive(Debug, Args)]
pub struct InfoCommand {
    /// Output in JSON format (default: table format)
    #[arg(long)]
    pub json: bool,
}

impl Command for InfoCommand {
    type Output = ();

    fn execute(&self, context: &RuntimeContext) -> Result<()> {
        let info = gather_info(context);

        if self.json {
            let json = serde_json::to_string_pretty(&info).map_err(anyhow::Error::from)?;
            println!("{json}");
        } else {
            display_table(&info);
        }
        Ok(())
    }
}

/// Drop vergen's placeholder for values it could not determine
fn vergen_value(value: Option<&'static str>) -> Option<String> {
    value
        .filter(|v| !v.is_empty() && *v != "VERGEN_IDEMPOTENT_OUTPUT")
        .map(str::to_string)
}

fn gather_build_info() -> BuildInfo {
    BuildInfo {
        rustc: option_env!("VERGEN_RUSTC_SEMVER")
            .unwrap_or(UNKNOWN)
            .to_string(),
        timestamp: option_env!("VERGEN_BUILD_TIMESTAMP").and_then(|s| {
            chrono::DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        }),
        git_sha: vergen_value(option_env!("VERGEN_GIT_SHA")),
        commit_date: vergen_value(option_env!("VERGEN_GIT_COMMIT_DATE")),
    }
}

fn gather_paths(config: &Config) -> PathsInfo {
    let cache = config.cache_root();
    PathsInfo {
        mirror: cache.join("repo.git").display().to_string(),
        snapshots: cache.join("snapshots").display().to_string(),
        cache: cache.display().to_string(),
        output: config.output.path.display().to_string(),
    }
}

fn gather_info(context: &RuntimeContext) -> InfoData {
    debug!("Gathering build and path information");
    let config = &context.config;

    InfoData {
        hookscope: HookscopeInfo {
            version: env!("CARGO_PKG_VERSION").to_string(),
            config: context.config_path().display().to_string(),
            config_exists: context.config_exists(),
        },
        build: gather_build_info(),
        paths: gather_paths(config),
        source: SourceInfo {
            remote: config.source.remote.clone(),
            latest_ref: config.source.latest_ref.clone(),
            directories: config.source.directories.clone(),
            max_workers: config.parallel.max_workers,
            fetch_depth: config.cache.fetch_depth,
        },
    }
}

fn display_table(info: &InfoData) {
    print_section_header("Hookscope");
    print_row("Version", &info.hookscope.version, true, None);
    print_row(
        "Config",
        &info.hookscope.config,
        info.hookscope.config_exists,
        (!info.hookscope.config_exists).then_some("defaults in use"),
    );
    println!();

    print_section_header("Build");
    print_row("Rustc", &info.build.rustc, info.build.rustc != UNKNOWN, None);
    if let Some(time) = info.build.timestamp.as_ref() {
        print_row("Timestamp", time, true, None);
    }
    match info.build.git_sha.as_ref() {
        Some(sha) => print_row("Git SHA", sha, true, info.build.commit_date.as_deref()),
        None => print_row("Git SHA", NOT_FOUND, false, None),
    }
    println!();

    print_section_header("Paths");
    print_row("Cache", &info.paths.cache, true, None);
    print_row("Mirror", &info.paths.mirror, true, None);
    print_row("Snapshots", &info.paths.snapshots, true, None);
    print_row("Output", &info.paths.output, true, None);
    println!();

    print_section_header("Source");
    print_row("Remote", &info.source.remote, true, None);
    print_row("Latest ref", &info.source.latest_ref, true, None);
    print_row("Directories", &info.source.directories.join(", "), true, None);
    print_row("Workers", &info.source.max_workers.to_string(), true, None);
    let depth = if info.source.fetch_depth == 0 {
        "full".to_string()
    } else {
        info.source.fetch_depth.to_string()
    };
    print_row("Fetch depth", &depth, true, None);
    println!("{}", "Run with --json for machine-readable output".dimmed());
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use std::path::Path;

    #[test]
    fn test_paths_follow_cache_root() {
        let config = Config::from_toml_str("[cache]\ndir = \"cache\"\n", Path::new("/work")).unwrap();
        let paths = gather_paths(&config);
        assert_eq!(paths.cache, "/work/cache");
        assert_eq!(paths.mirror, "/work/cache/repo.git");
        assert_eq!(paths.snapshots, "/work/cache/snapshots");
        assert_eq!(paths.output, "/work/hooks.json");
    }

    #[test]
    fn test_info_json_fields() {
        let context = RuntimeContext::new(Config::default(), "/nonexistent/hookscope.toml");
        let json = serde_json::to_value(gather_info(&context)).unwrap();

        assert_eq!(json["hookscope"]["version"], env!("CARGO_PKG_VERSION"));
        assert_eq!(json["hookscope"]["configExists"], false);
        assert!(json["build"]["rustc"].is_string());
        assert!(json["paths"]["snapshots"].is_string());
        assert_eq!(json["source"]["latestRef"], "main");
    }

    #[test]
    fn test_vergen_placeholder_is_dropped() {
        assert_eq!(vergen_value(Some("VERGEN_IDEMPOTENT_OUTPUT")), None);
        assert_eq!(vergen_value(Some("")), None);
        assert_eq!(vergen_value(Some("abc123")), Some("abc123".to_string()));
    }
}
