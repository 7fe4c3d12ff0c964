//! Hookscope CLI library
//!
//! Argument parsing and command dispatch for the `hookscope` binary, kept in
//! a library so commands can be exercised from tests.

pub mod cmd;
pub mod command;
pub mod common;
pub mod error;
pub mod ui;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hookscope_config::Config;
use std::path::PathBuf;

use command::Command;
use common::RuntimeContext;

/// Hookscope - extension point history across releases
#[derive(Parser)]
#[command(name = "hookscope")]
#[command(about = "Track plugin outlets, transformers and app events across releases")]
#[command(version)]
#[command(long_about = "Track plugin outlets, transformers and app events across releases

Scans every tagged release of the upstream repository (plus the tip of the
latest branch) in parallel, extracts the extension points each version
exposes, and writes one JSON report describing when each hook appeared,
where it lives, how its arguments changed and whether it was retired.")]
pub struct Cli {
    /// Path to the config file
    #[arg(long, env = "HOOKSCOPE_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose output (shows DEBUG level logs)
    #[arg(short, long)]
    pub verbose: bool,

    /// Write logs to a file (useful for debugging)
    #[arg(long, env = "HOOKSCOPE_LOG_FILE", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for hookscope CLI
#[derive(Subcommand)]
pub enum Commands {
    /// Scan all versions and write the report
    #[command(long_about = "Scan all versions and write the report

Versions come from the remote's release tags unless --versions or
--snapshots is given. Versions that fail to fetch or scan are reported and
contribute nothing; the command only fails when there is nothing to scan.

Examples:
  • hookscope scan
      → Scan every release plus latest, write hooks.json

  • hookscope scan --limit 5 --workers 4
      → Scan the five newest releases and latest with four workers

  • hookscope scan --snapshots ./snapshots --output out/hooks.json
      → Scan pre-exported trees in ./snapshots/<version>/ without git")]
    Scan(cmd::scan::ScanCommand),

    /// List the versions a scan would cover
    Versions(cmd::versions::VersionsCommand),

    /// Extract hooks from a single directory
    Extract(cmd::extract::ExtractCommand),

    /// Display build information and resolved paths
    Info(cmd::info::InfoCommand),
}

fn load_config(cli: &Cli) -> Result<(Config, PathBuf)> {
    let path = cli
        .config
        .clone()
        .unwrap_or_else(hookscope_config::dirs::default_config_file);

    let config = if cli.config.is_some() {
        // An explicitly named file must exist
        Config::load(&path)
    } else {
        Config::load_or_default(&path)
    }
    .map_err(error::CommandError::Config)
    .with_context(|| format!("Failed to load configuration from {}", path.display()))?;

    Ok((config, path))
}

fn execute_command(command: &Commands, context: &RuntimeContext) -> error::Result<()> {
    match command {
        Commands::Scan(scan_cmd) => {
            scan_cmd.execute(context)?;
        }
        Commands::Versions(versions_cmd) => {
            versions_cmd.execute(context)?;
        }
        Commands::Extract(extract_cmd) => {
            extract_cmd.execute(context)?;
        }
        Commands::Info(info_cmd) => {
            info_cmd.execute(context)?;
        }
    }
    Ok(())
}

/// Run the CLI
pub fn run(cli: Cli) -> Result<()> {
    hookscope_config::logging::init(cli.verbose, cli.log_file.as_deref())?;

    let (config, config_path) = load_config(&cli)?;
    let context = RuntimeContext::new(config, config_path);

    execute_command(&cli.command, &context)?;
    Ok(())
}
