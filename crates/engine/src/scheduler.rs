//! Parallel per-version scanning
//!
//! Workers pull the next unclaimed version from a shared cursor, so a worker
//! that finishes early immediately moves on to the next version. Results are
//! handed back in completion order; nothing downstream depends on that order.

use crate::extract::Extractor;
use crate::merge::fold_occurrences;
use hookscope_core::{Error, HookOccurrence, Result, SnapshotProvider, Version};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Upper bound on concurrent workers regardless of configuration
pub const MAX_WORKERS: usize = 10;

/// Outcome of scanning one version
#[derive(Debug, Clone)]
pub struct VersionScan {
    /// Version scanned
    pub version: Version,
    /// Occurrences, already folded by `(name, type, file)`
    pub occurrences: Vec<HookOccurrence>,
    /// Why the version contributed nothing, if it failed
    pub error: Option<String>,
    /// Wall time spent on provisioning and extraction
    pub elapsed: Duration,
}

impl VersionScan {
    /// Whether provisioning and extraction both completed
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Runs snapshot provisioning and extraction over many versions
pub struct Scheduler<P> {
    provider: P,
    extractor: Extractor,
    max_workers: usize,
}

impl<P: SnapshotProvider> Scheduler<P> {
    /// Create a scheduler that runs at most `max_workers` workers
    pub fn new(provider: P, extractor: Extractor, max_workers: usize) -> Self {
        Self {
            provider,
            extractor,
            max_workers,
        }
    }

    /// Workers used for `pending` versions
    ///
    /// Bounded by available parallelism, the amount of work, the configured
    /// maximum and [`MAX_WORKERS`]; at least one when there is work.
    pub fn worker_count(&self, pending: usize) -> usize {
        let parallelism = thread::available_parallelism().map_or(1, usize::from);
        parallelism
            .min(pending)
            .min(self.max_workers)
            .min(MAX_WORKERS)
            .max(usize::from(pending > 0))
    }

    /// Scan every version, calling `on_complete` as each one finishes
    ///
    /// A failing or panicking version is reported with zero occurrences and
    /// never stops its siblings. Only failing to start the worker pool is an
    /// error.
    pub fn run<F>(&self, versions: &[Version], on_complete: F) -> Result<Vec<VersionScan>>
    where
        F: Fn(&VersionScan) + Sync,
    {
        let workers = self.worker_count(versions.len());
        if workers == 0 {
            return Ok(Vec::new());
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|index| format!("hookscope-worker-{index}"))
            .build()
            .map_err(|e| Error::Message(format!("Failed to start worker pool: {e}")))?;

        info!(versions = versions.len(), workers, "Scanning versions");

        let cursor = AtomicUsize::new(0);
        let (sender, receiver) = mpsc::channel();
        let on_complete = &on_complete;

        pool.scope(|scope| {
            for _ in 0..workers {
                let sender = sender.clone();
                let cursor = &cursor;
                scope.spawn(move |_| {
                    while let Some(version) = versions.get(cursor.fetch_add(1, Ordering::Relaxed)) {
                        let scan = self.scan_version(*version);
                        on_complete(&scan);
                        if sender.send(scan).is_err() {
                            break;
                        }
                    }
                });
            }
        });
        drop(sender);

        Ok(receiver.into_iter().collect())
    }

    /// Provision, extract and fold one version
    pub fn scan_version(&self, version: Version) -> VersionScan {
        let started = Instant::now();

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| -> Result<Vec<HookOccurrence>> {
            let root = self.provider.provision(&version)?;
            let occurrences = self.extractor.extract(&root)?;
            Ok(fold_occurrences(occurrences))
        }));

        let (occurrences, error) = match outcome {
            Ok(Ok(occurrences)) => (occurrences, None),
            Ok(Err(e)) => (Vec::new(), Some(e.to_string())),
            Err(payload) => (Vec::new(), Some(panic_message(payload.as_ref()))),
        };
        let elapsed = started.elapsed();

        match &error {
            None => info!(
                %version,
                occurrences = occurrences.len(),
                elapsed = ?elapsed,
                "Version scanned"
            ),
            Some(reason) => warn!(%version, error = %reason, "Version failed, counted as empty"),
        }

        VersionScan {
            version,
            occurrences,
            error,
            elapsed,
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    let detail = payload
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown cause".to_string());
    format!("worker panicked: {detail}")
}
