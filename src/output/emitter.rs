//! Concurrent verification and writing of surviving hostnames.

use std::collections::HashSet;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures::stream::FuturesUnordered;
use futures::StreamExt;
use log::{info, warn};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use super::format::{format_hostname, OutputFormat};
use super::sink::OutputSinks;
use super::verify::{ResultHook, TrustedVerifier};
use crate::config::DEFAULT_WILDCARD_THREADS;
use crate::error_handling::{InfoType, ItemOutcome, ProcessingStats, SkipReason};
use crate::store::RecordStore;

/// Tuning for the output phase.
#[derive(Debug, Clone)]
pub struct EmitOptions {
    /// Line format
    pub format: OutputFormat,
    /// Maximum number of verify/write tasks in flight
    pub concurrency: usize,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::Plain,
            concurrency: DEFAULT_WILDCARD_THREADS,
        }
    }
}

/// Summary of the output phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmitReport {
    /// Distinct hostnames across all surviving buckets
    pub unique_hostnames: usize,
    /// Hostnames written to the sinks
    pub resolved: usize,
    /// Hostnames dropped by trusted verification
    pub rejected: usize,
}

/// Writes the deduplicated hostnames of a store to the configured sinks.
pub struct OutputEmitter {
    sinks: Arc<OutputSinks>,
    verifier: Option<Arc<dyn TrustedVerifier>>,
    on_result: Option<ResultHook>,
    stats: Arc<ProcessingStats>,
    options: EmitOptions,
}

struct EmitTask {
    sinks: Arc<OutputSinks>,
    verifier: Option<Arc<dyn TrustedVerifier>>,
    on_result: Option<ResultHook>,
    stats: Arc<ProcessingStats>,
    resolved: Arc<AtomicUsize>,
    format: OutputFormat,
    hostname: String,
    _permit: OwnedSemaphorePermit,
}

impl OutputEmitter {
    /// Creates an emitter without trusted verification.
    pub fn new(sinks: Arc<OutputSinks>, options: EmitOptions, stats: Arc<ProcessingStats>) -> Self {
        Self {
            sinks,
            verifier: None,
            on_result: None,
            stats,
            options,
        }
    }

    /// Re-verifies every hostname through `verifier` before writing it.
    pub fn with_verifier(mut self, verifier: Arc<dyn TrustedVerifier>) -> Self {
        self.verifier = Some(verifier);
        self
    }

    /// Calls `hook` with every successful trusted verification.
    pub fn with_result_hook(mut self, hook: ResultHook) -> Self {
        self.on_result = Some(hook);
        self
    }

    /// The sinks this emitter writes to.
    pub fn sinks(&self) -> &Arc<OutputSinks> {
        &self.sinks
    }

    /// Emits every distinct hostname of `store` once.
    ///
    /// Hostnames are deduplicated while walking the buckets; each new one is
    /// handed to a bounded task that verifies (if configured), formats and
    /// writes it. All tasks are joined before the sinks are flushed.
    ///
    /// # Errors
    ///
    /// Returns the first sink write error, after every task has finished.
    pub async fn emit(&self, store: &RecordStore) -> io::Result<EmitReport> {
        let semaphore = Arc::new(Semaphore::new(self.options.concurrency.max(1)));
        let resolved = Arc::new(AtomicUsize::new(0));
        let mut seen: HashSet<String> = HashSet::new();
        let mut tasks = FuturesUnordered::new();

        for (_, entry) in store.iter() {
            for hostname in entry.hostnames() {
                if !seen.insert(hostname.clone()) {
                    self.stats.increment_info(InfoType::DuplicateHostname);
                    continue;
                }

                let permit = match Arc::clone(&semaphore).acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        warn!("Semaphore closed, skipping output of {hostname}");
                        continue;
                    }
                };

                tasks.push(tokio::spawn(emit_hostname(EmitTask {
                    sinks: Arc::clone(&self.sinks),
                    verifier: self.verifier.clone(),
                    on_result: self.on_result.clone(),
                    stats: Arc::clone(&self.stats),
                    resolved: Arc::clone(&resolved),
                    format: self.options.format,
                    hostname: hostname.clone(),
                    _permit: permit,
                })));
            }
        }

        let mut rejected = 0;
        let mut first_error: Option<io::Error> = None;
        while let Some(task_result) = tasks.next().await {
            match task_result {
                Ok(Ok(ItemOutcome::Completed(()))) => {}
                Ok(Ok(ItemOutcome::Skipped(_))) => rejected += 1,
                Ok(Err(e)) => {
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
                Err(join_error) => warn!("Output task panicked: {:?}", join_error),
            }
        }

        if let Some(e) = first_error {
            return Err(e);
        }
        self.sinks.flush()?;

        let resolved = resolved.load(Ordering::SeqCst);
        info!("Total resolved: {resolved}");

        Ok(EmitReport {
            unique_hostnames: seen.len(),
            resolved,
            rejected,
        })
    }
}

async fn emit_hostname(task: EmitTask) -> io::Result<ItemOutcome<()>> {
    let EmitTask {
        sinks,
        verifier,
        on_result,
        stats,
        resolved,
        format,
        hostname,
        _permit,
    } = task;

    if let Some(verifier) = verifier {
        let reason = match verifier.query_one(&hostname).await {
            Ok(response) if response.has_answer() => {
                info!("resolved with trusted resolver: {hostname}");
                stats.increment_info(InfoType::TrustedVerified);
                if let Some(hook) = on_result {
                    hook(&response);
                }
                None
            }
            Ok(_) => Some(SkipReason::NoAnswer),
            Err(e) => Some(SkipReason::LookupFailed(format!("{e:#}"))),
        };

        if let Some(reason) = reason {
            info!("not resolved with trusted resolver - skipping: {hostname} ({reason:?})");
            if let Some(error_type) = reason.error_type() {
                stats.increment_error(error_type);
            }
            return Ok(ItemOutcome::Skipped(reason));
        }
    }

    sinks.write_line(&format_hostname(&hostname, format))?;
    resolved.fetch_add(1, Ordering::SeqCst);
    Ok(ItemOutcome::Completed(()))
}
