//! Scan command implementation
//!
//! Runs the whole pipeline: catalog, parallel snapshot and extraction,
//! merge, report, artifact.

use chrono::Utc;
use clap::Args;
use hookscope_config::Config;
use hookscope_engine::{
    DirectorySnapshots, Extractor, GitSnapshotProvider, HookIndex, Report, Scheduler,
    SnapshotProvider, Version, VersionCatalog, VersionScan, write_report,
};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

use crate::command::Command;
use crate::common::RuntimeContext;
use crate::error::{CommandError, Result};
use crate::ui;

/// Scan command
#[derive(Debug, Args)]
pub struct ScanCommand {
    /// Scan these versions instead of the remote catalog (comma-separated)
    #[arg(long, value_delimiter = ',', value_name = "VERSIONS")]
    pub versions: Vec<Version>,

    /// Only scan the newest N releases (latest is always kept)
    #[arg(long, value_name = "N")]
    pub limit: Option<usize>,

    /// Upper bound on concurrent workers (overrides parallel.maxWorkers)
    #[arg(short, long, value_name = "N", value_parser = clap::value_parser!(u16).range(1..))]
    pub workers: Option<u16>,

    /// Read pre-materialized snapshots from DIR/<version>/ instead of git
    #[arg(long, value_name = "DIR")]
    pub snapshots: Option<PathBuf>,

    /// Where to write the report (overrides output.path)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

impl Command for ScanCommand {
    type Output = Report;

    fn execute(&self, context: &RuntimeContext) -> Result<Report> {
        let config = &context.config;
        let started = Instant::now();

        let catalog = self.catalog(config)?;
        let catalog = match self.limit {
            Some(limit) => catalog.limit(limit),
            None => catalog,
        };
        if catalog.is_empty() {
            return Err(CommandError::NoVersions);
        }
        let versions = catalog.into_versions();

        let scans = match &self.snapshots {
            Some(dir) => self.run(DirectorySnapshots::new(dir), config, &versions)?,
            None => self.run(GitSnapshotProvider::new(config), config, &versions)?,
        };

        let index = HookIndex::from_scans(&scans);
        if index.scanned_versions().is_empty() {
            warn!(versions = versions.len(), "Every version failed; the report will be empty");
        }

        let report = Report::assemble(&index, config.output.top_n, Utc::now());
        let output = self.output_path(config);
        write_report(&report, &output).map_err(|source| CommandError::ArtifactWrite {
            path: output.clone(),
            source,
        })?;

        info!(
            hooks = report.total_hooks,
            elapsed = ?started.elapsed(),
            "Scan complete"
        );

        let failed: Vec<Version> = index.failed_versions().iter().copied().collect();
        ui::print_scan_summary(&report, versions.len(), &failed, &output);
        Ok(report)
    }
}

impl ScanCommand {
    fn output_path(&self, config: &Config) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| config.output.path.clone())
    }

    fn worker_cap(&self, config: &Config) -> usize {
        self.workers
            .map_or(config.parallel.max_workers, usize::from)
    }

    /// Versions from the command line, the snapshot directory or the remote
    fn catalog(&self, config: &Config) -> Result<VersionCatalog> {
        if !self.versions.is_empty() {
            return Ok(VersionCatalog::from_versions(self.versions.iter().copied()));
        }

        if let Some(dir) = &self.snapshots {
            let versions = DirectorySnapshots::new(dir).versions()?;
            return Ok(VersionCatalog::from_versions(versions));
        }

        let spinner = ui::create_spinner(&format!("Listing tags of {}", config.source.remote));
        let catalog = VersionCatalog::fetch(&config.source);
        spinner.finish_and_clear();
        Ok(catalog)
    }

    fn run<P: SnapshotProvider>(
        &self,
        provider: P,
        config: &Config,
        versions: &[Version],
    ) -> Result<Vec<VersionScan>> {
        let scheduler = Scheduler::new(
            provider,
            Extractor::new(&config.scan),
            self.worker_cap(config),
        );

        let pb = ui::create_progress_bar(versions.len() as u64, "Scanning");
        let scans = scheduler.run(versions, |scan| {
            pb.inc(1);
            pb.set_message(scan.version.to_string());
        })?;
        pb.finish_and_clear();
        Ok(scans)
    }
}
