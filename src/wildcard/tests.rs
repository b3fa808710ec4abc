//! Wildcard module tests.

use super::*;
use crate::error_handling::{ErrorType, InfoType, ProcessingStats};
use crate::parse::ResolutionEvent;
use crate::store::RecordStore;
use futures::FutureExt;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Probe with canned answers per hostname. Unknown names probe clean.
#[derive(Default)]
struct FakeProbe {
    verdicts: HashMap<String, Result<WildcardVerdict, String>>,
    calls: AtomicUsize,
    probed: Mutex<Vec<String>>,
}

impl FakeProbe {
    fn with(mut self, host: &str, verdict: Result<WildcardVerdict, &str>) -> Self {
        self.verdicts
            .insert(host.to_string(), verdict.map_err(|e| e.to_string()));
        self
    }

    fn probed(&self) -> Vec<String> {
        let mut probed = self.probed.lock().unwrap().clone();
        probed.sort();
        probed
    }
}

impl WildcardProbe for FakeProbe {
    fn lookup_host<'a>(
        &'a self,
        hostname: &'a str,
    ) -> BoxFuture<'a, anyhow::Result<WildcardVerdict>> {
        async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.probed.lock().unwrap().push(hostname.to_string());
            match self.verdicts.get(hostname) {
                Some(Ok(verdict)) => Ok(verdict.clone()),
                Some(Err(message)) => Err(anyhow::anyhow!(message.clone())),
                None => Ok(WildcardVerdict::default()),
            }
        }
        .boxed()
    }
}

fn wildcard(addresses: &[[u8; 4]]) -> WildcardVerdict {
    WildcardVerdict {
        is_wildcard: true,
        wildcard_addresses: addresses.iter().map(|o| Ipv4Addr::from(*o)).collect(),
    }
}

fn addr(a: &str) -> StoreKey {
    StoreKey::Address(a.to_string())
}

fn store_with(buckets: &[(&str, &[&str])]) -> RecordStore {
    let mut store = RecordStore::new();
    for (ip, hosts) in buckets {
        for host in *hosts {
            store
                .ingest(ResolutionEvent::new(host, vec![ip.to_string()]))
                .unwrap();
        }
    }
    store
}

fn filter_with(probe: Arc<FakeProbe>, options: FilterOptions) -> WildcardFilter {
    WildcardFilter::new(
        probe,
        Arc::new(WildcardSet::new()),
        Arc::new(ProcessingStats::new()),
        options,
    )
}

const SINK_HOSTS: &[&str] = &[
    "w1.example.com",
    "w2.example.com",
    "w3.example.com",
    "w4.example.com",
    "w5.example.com",
];

#[tokio::test]
async fn test_bucket_removed_when_any_probe_confirms() {
    let probe = Arc::new(FakeProbe::default().with("w3.example.com", Ok(wildcard(&[]))));
    let mut store = store_with(&[("10.0.0.5", SINK_HOSTS), ("10.0.0.9", &["app.example.com"])]);

    let filter = filter_with(Arc::clone(&probe), FilterOptions::default());
    let report = filter.filter(&mut store).await;

    assert!(!store.exists(&addr("10.0.0.5")));
    assert!(store.exists(&addr("10.0.0.9")));
    assert_eq!(report.buckets_probed, 1);
    assert_eq!(report.keys_removed, 1);
    assert_eq!(report.wildcards_confirmed, 1);
    assert!(filter.wildcards().contains(&addr("10.0.0.5")));
}

#[tokio::test]
async fn test_small_bucket_not_probed_without_strict() {
    let probe = Arc::new(
        FakeProbe::default()
            .with("a.example.com", Ok(wildcard(&[])))
            .with("b.example.com", Ok(wildcard(&[]))),
    );
    let mut store = store_with(&[("10.0.0.7", &["a.example.com", "b.example.com", "c.example.com"])]);

    let report = filter_with(Arc::clone(&probe), FilterOptions::default())
        .filter(&mut store)
        .await;

    assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
    assert_eq!(report, FilterReport::default());
    assert_eq!(store.get(&addr("10.0.0.7")).unwrap().count(), 3);
}

#[tokio::test]
async fn test_strict_mode_probes_every_bucket() {
    let probe = Arc::new(FakeProbe::default().with("a.example.com", Ok(wildcard(&[]))));
    let mut store = store_with(&[("10.0.0.7", &["a.example.com"]), ("10.0.0.8", &["b.example.com"])]);

    let options = FilterOptions {
        strict: true,
        ..FilterOptions::default()
    };
    let report = filter_with(Arc::clone(&probe), options)
        .filter(&mut store)
        .await;

    assert_eq!(probe.probed(), vec!["a.example.com", "b.example.com"]);
    assert_eq!(report.buckets_probed, 2);
    assert!(!store.exists(&addr("10.0.0.7")));
    assert!(store.exists(&addr("10.0.0.8")));
}

#[tokio::test]
async fn test_threshold_counts_repeated_hostnames() {
    let probe = Arc::new(FakeProbe::default());
    let same: &[&str] = &["dup.example.com"; 5];
    let mut store = store_with(&[("10.0.0.6", same)]);

    let report = filter_with(Arc::clone(&probe), FilterOptions::default())
        .filter(&mut store)
        .await;

    assert_eq!(report.buckets_probed, 1);
    assert_eq!(report.probes_submitted, 5);
    assert!(store.exists(&addr("10.0.0.6")));
}

#[tokio::test]
async fn test_probe_error_keeps_bucket() {
    let mut probe = FakeProbe::default();
    for host in SINK_HOSTS {
        probe = probe.with(host, Err("SERVFAIL"));
    }
    let probe = Arc::new(probe);
    let stats = Arc::new(ProcessingStats::new());
    let filter = WildcardFilter::new(
        probe,
        Arc::new(WildcardSet::new()),
        Arc::clone(&stats),
        FilterOptions::default(),
    );
    let mut store = store_with(&[("10.0.0.5", SINK_HOSTS)]);

    let report = filter.filter(&mut store).await;

    assert!(store.exists(&addr("10.0.0.5")));
    assert_eq!(report.probe_failures, 5);
    assert_eq!(report.keys_removed, 0);
    assert_eq!(stats.get_error_count(ErrorType::WildcardProbeError), 5);
}

#[tokio::test]
async fn test_observed_addresses_remove_other_buckets() {
    let verdict = WildcardVerdict {
        is_wildcard: false,
        wildcard_addresses: [Ipv4Addr::new(10, 0, 0, 77)].into_iter().collect(),
    };
    let probe = Arc::new(FakeProbe::default().with("w1.example.com", Ok(verdict)));
    let mut store = store_with(&[
        ("10.0.0.5", SINK_HOSTS),
        ("10.0.0.77", &["other.example.com"]),
    ]);

    let report = filter_with(probe, FilterOptions::default())
        .filter(&mut store)
        .await;

    assert!(store.exists(&addr("10.0.0.5")));
    assert!(!store.exists(&addr("10.0.0.77")));
    assert_eq!(report.keys_removed, 1);
}

#[tokio::test]
async fn test_preseeded_wildcard_is_skipped_and_removed() {
    let probe = Arc::new(FakeProbe::default());
    let filter = WildcardFilter::new(
        Arc::clone(&probe) as Arc<dyn WildcardProbe>,
        Arc::new(WildcardSet::with_keys([addr("10.0.0.5")])),
        Arc::new(ProcessingStats::new()),
        FilterOptions::default(),
    );
    let mut store = store_with(&[("10.0.0.5", SINK_HOSTS)]);

    let report = filter.filter(&mut store).await;

    assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
    assert!(store.is_empty());
    assert_eq!(report.keys_removed, 1);
}

#[tokio::test]
async fn test_confirmed_bucket_cancels_pending_siblings() {
    // One permit: each sibling starts only after the previous one finished
    let mut probe = FakeProbe::default();
    for host in SINK_HOSTS {
        probe = probe.with(host, Ok(wildcard(&[])));
    }
    let probe = Arc::new(probe);
    let stats = Arc::new(ProcessingStats::new());
    let filter = WildcardFilter::new(
        Arc::clone(&probe) as Arc<dyn WildcardProbe>,
        Arc::new(WildcardSet::new()),
        Arc::clone(&stats),
        FilterOptions {
            concurrency: 1,
            ..FilterOptions::default()
        },
    );
    let mut store = store_with(&[("10.0.0.5", SINK_HOSTS)]);

    let report = filter.filter(&mut store).await;

    assert_eq!(probe.calls.load(Ordering::SeqCst), 1);
    assert_eq!(report.probes_submitted, 5);
    assert_eq!(report.probes_skipped, 4);
    assert_eq!(stats.get_info_count(InfoType::ProbeSkipped), 4);
    assert!(store.is_empty());
}

#[test]
fn test_wildcard_set_grows_only() {
    let set = WildcardSet::new();
    assert!(set.is_empty());
    assert!(set.insert(addr("192.0.2.1")));
    assert!(!set.insert(addr("192.0.2.1")));
    assert!(set.insert(StoreKey::Cname("x.example.com".into())));
    assert_eq!(set.len(), 2);
    assert_eq!(
        set.keys(),
        vec![addr("192.0.2.1"), StoreKey::Cname("x.example.com".into())]
    );
}

#[test]
fn test_probe_levels_under_root_domain() {
    let domains = vec!["example.com".to_string()];
    assert_eq!(
        probe_levels("a.b.example.com", &domains),
        vec!["example.com", "a.b.example.com", "b.example.com"]
    );
    assert_eq!(probe_levels("example.com", &domains), vec!["example.com"]);
}

#[test]
fn test_probe_levels_prefers_longest_root() {
    let domains = vec!["example.com".to_string(), "dev.example.com".to_string()];
    assert_eq!(
        probe_levels("api.dev.example.com", &domains),
        vec!["dev.example.com", "api.dev.example.com"]
    );
}

#[test]
fn test_probe_levels_without_root_uses_parent() {
    let domains = vec!["example.com".to_string()];
    assert_eq!(
        probe_levels("www.notexample.com", &domains),
        vec!["notexample.com"]
    );
    assert!(probe_levels("localhost", &domains).is_empty());
}
