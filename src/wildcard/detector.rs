//! Concurrent wildcard filtering over a record store.

use std::sync::Arc;

use futures::stream::FuturesUnordered;
use futures::StreamExt;
use log::{debug, warn};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio_util::sync::CancellationToken;

use super::{WildcardProbe, WildcardSet};
use crate::config::{DEFAULT_WILDCARD_THREADS, WILDCARD_PROBE_THRESHOLD};
use crate::error_handling::{InfoType, ItemOutcome, ProcessingStats, SkipReason};
use crate::store::{RecordStore, StoreKey};

/// Tuning for the wildcard filter.
#[derive(Debug, Clone)]
pub struct FilterOptions {
    /// Maximum number of probes in flight
    pub concurrency: usize,
    /// Probe every bucket regardless of its count
    pub strict: bool,
    /// Minimum bucket count that makes a bucket probe-eligible
    pub threshold: usize,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_WILDCARD_THREADS,
            strict: false,
            threshold: WILDCARD_PROBE_THRESHOLD,
        }
    }
}

/// Summary of one filtering pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterReport {
    /// Buckets that were probe-eligible
    pub buckets_probed: usize,
    /// Probe tasks submitted
    pub probes_submitted: usize,
    /// Probes skipped because a sibling already confirmed the bucket
    pub probes_skipped: usize,
    /// Probes that failed; their buckets were kept
    pub probe_failures: usize,
    /// Probes that reported a wildcard
    pub wildcards_confirmed: usize,
    /// Buckets deleted from the store
    pub keys_removed: usize,
}

/// Wildcard detection engine.
pub struct WildcardFilter {
    probe: Arc<dyn WildcardProbe>,
    wildcards: Arc<WildcardSet>,
    stats: Arc<ProcessingStats>,
    options: FilterOptions,
}

struct ProbeTask {
    probe: Arc<dyn WildcardProbe>,
    wildcards: Arc<WildcardSet>,
    stats: Arc<ProcessingStats>,
    key: StoreKey,
    hostname: String,
    bucket_token: CancellationToken,
    _permit: OwnedSemaphorePermit,
}

impl WildcardFilter {
    /// Creates a filter that records confirmations into `wildcards`.
    pub fn new(
        probe: Arc<dyn WildcardProbe>,
        wildcards: Arc<WildcardSet>,
        stats: Arc<ProcessingStats>,
        options: FilterOptions,
    ) -> Self {
        Self {
            probe,
            wildcards,
            stats,
            options,
        }
    }

    /// The set of confirmed wildcard keys.
    pub fn wildcards(&self) -> &Arc<WildcardSet> {
        &self.wildcards
    }

    /// Probes suspicious buckets and deletes every confirmed key from `store`.
    ///
    /// Buckets are walked sequentially. Each hostname of an eligible bucket is
    /// probed in its own task, bounded by `options.concurrency`. Tasks of the
    /// same bucket share a cancellation token that is signalled once any of
    /// them confirms a wildcard; tasks that have not started yet then skip
    /// their probe. All tasks are joined before any key is deleted.
    pub async fn filter(&self, store: &mut RecordStore) -> FilterReport {
        let semaphore = Arc::new(Semaphore::new(self.options.concurrency.max(1)));
        let mut tasks = FuturesUnordered::new();
        let mut report = FilterReport::default();

        for (key, entry) in store.iter() {
            if self.wildcards.contains(key) {
                continue;
            }
            if entry.count() < self.options.threshold && !self.options.strict {
                continue;
            }

            report.buckets_probed += 1;
            let bucket_token = CancellationToken::new();

            for hostname in entry.hostnames() {
                let permit = match Arc::clone(&semaphore).acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        warn!("Semaphore closed, skipping wildcard probe for {hostname}");
                        continue;
                    }
                };

                report.probes_submitted += 1;
                tasks.push(tokio::spawn(probe_hostname(ProbeTask {
                    probe: Arc::clone(&self.probe),
                    wildcards: Arc::clone(&self.wildcards),
                    stats: Arc::clone(&self.stats),
                    key: key.clone(),
                    hostname: hostname.clone(),
                    bucket_token: bucket_token.clone(),
                    _permit: permit,
                })));
            }
        }

        while let Some(task_result) = tasks.next().await {
            match task_result {
                Ok(ItemOutcome::Completed(true)) => report.wildcards_confirmed += 1,
                Ok(ItemOutcome::Completed(false)) => {}
                Ok(ItemOutcome::Skipped(SkipReason::Cancelled)) => report.probes_skipped += 1,
                Ok(ItemOutcome::Skipped(_)) => report.probe_failures += 1,
                Err(join_error) => {
                    warn!("Wildcard probe task panicked: {:?}", join_error);
                    report.probe_failures += 1;
                }
            }
        }

        for key in self.wildcards.keys() {
            if store.delete(&key).is_some() {
                debug!("Dropped wildcard bucket {key}");
                report.keys_removed += 1;
            }
        }

        report
    }
}

async fn probe_hostname(task: ProbeTask) -> ItemOutcome<bool> {
    let ProbeTask {
        probe,
        wildcards,
        stats,
        key,
        hostname,
        bucket_token,
        _permit,
    } = task;

    if bucket_token.is_cancelled() {
        stats.increment_info(InfoType::ProbeSkipped);
        return ItemOutcome::Skipped(SkipReason::Cancelled);
    }

    debug!("Started filtering wildcards for {hostname}");

    let verdict = match probe.lookup_host(&hostname).await {
        Ok(verdict) => verdict,
        Err(e) => {
            warn!("Wildcard probe failed for {hostname}, keeping it: {e:#}");
            let reason = SkipReason::ProbeFailed(e.to_string());
            if let Some(error_type) = reason.error_type() {
                stats.increment_error(error_type);
            }
            return ItemOutcome::Skipped(reason);
        }
    };

    debug!(
        "isWildcard: {}, ips: {:?}, hostname: {hostname}",
        verdict.is_wildcard, verdict.wildcard_addresses
    );

    for address in &verdict.wildcard_addresses {
        if wildcards.insert(StoreKey::from(*address)) {
            debug!("Removing wildcard {address}");
        }
    }

    if verdict.is_wildcard {
        // At least once this bucket's address answered for a wildcard name
        wildcards.insert(key.clone());
        bucket_token.cancel();
        stats.increment_info(InfoType::WildcardConfirmed);
        debug!("Removed wildcard {key}");
    }

    ItemOutcome::Completed(verdict.is_wildcard)
}
