//! Wildcard DNS detection and filtering.
//!
//! Buckets whose address answers for many hostnames are re-probed through an
//! independent resolution path. Addresses confirmed as wildcard sinks are
//! collected in a [`WildcardSet`] and their buckets removed from the store.

mod detector;
mod resolver;

use std::collections::HashSet;
use std::net::Ipv4Addr;
use std::sync::{Mutex, PoisonError};

use futures::future::BoxFuture;

use crate::store::StoreKey;

// Re-export public API
pub use detector::{FilterOptions, FilterReport, WildcardFilter};
pub use resolver::{probe_levels, DnsWildcardProbe};

/// Outcome of probing one hostname.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WildcardVerdict {
    /// The hostname's own answers overlap the wildcard answers
    pub is_wildcard: bool,
    /// Addresses returned for random names next to the hostname
    pub wildcard_addresses: HashSet<Ipv4Addr>,
}

/// Resolution path used to decide whether a hostname is a wildcard answer.
///
/// Implementations must be independent of the bulk resolver.
pub trait WildcardProbe: Send + Sync {
    /// Probes `hostname`.
    ///
    /// An error means the verdict is unknown; callers keep the hostname.
    fn lookup_host<'a>(&'a self, hostname: &'a str)
        -> BoxFuture<'a, anyhow::Result<WildcardVerdict>>;
}

/// Keys confirmed as wildcard-producing during a run.
///
/// Only ever grows. Shared between probe tasks behind a mutex.
#[derive(Debug, Default)]
pub struct WildcardSet {
    keys: Mutex<HashSet<StoreKey>>,
}

impl WildcardSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a set pre-seeded with keys confirmed earlier.
    pub fn with_keys<I: IntoIterator<Item = StoreKey>>(keys: I) -> Self {
        Self {
            keys: Mutex::new(keys.into_iter().collect()),
        }
    }

    /// Adds `key`, returning `true` if it was not present.
    pub fn insert(&self, key: StoreKey) -> bool {
        self.keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key)
    }

    /// Returns `true` if `key` is confirmed.
    pub fn contains(&self, key: &StoreKey) -> bool {
        self.keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(key)
    }

    /// Number of confirmed keys.
    pub fn len(&self) -> usize {
        self.keys.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns `true` if nothing has been confirmed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sorted snapshot of the confirmed keys.
    pub fn keys(&self) -> Vec<StoreKey> {
        let mut keys: Vec<StoreKey> = self
            .keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect();
        keys.sort();
        keys
    }
}

#[cfg(test)]
mod tests;
