//! IP-to-hostname aggregation store.
//!
//! Maps every resolved address (or a synthetic `CNAME:<host>` key for names
//! that resolved without an A record) to the hostnames seen behind it.
//!
//! The store is owned by a single run. It is filled by one writer during
//! ingestion, pruned by deletion after wildcard filtering, and read by the
//! output phase.

use std::collections::BTreeMap;
use std::fmt;
use std::net::Ipv4Addr;

use crate::error_handling::StoreError;
use crate::parse::ResolutionEvent;

/// Prefix of synthetic keys for CNAME-only results.
pub const CNAME_KEY_PREFIX: &str = "CNAME:";

/// Key of a store bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StoreKey {
    /// A literal address as reported by the resolver
    Address(String),
    /// Hostname that resolved to a CNAME chain with no terminal A record
    Cname(String),
}

impl StoreKey {
    /// Parses the textual form produced by `Display`.
    pub fn parse(key: &str) -> Self {
        match key.strip_prefix(CNAME_KEY_PREFIX) {
            Some(hostname) => StoreKey::Cname(hostname.to_string()),
            None => StoreKey::Address(key.to_string()),
        }
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreKey::Address(address) => f.write_str(address),
            StoreKey::Cname(hostname) => write!(f, "{CNAME_KEY_PREFIX}{hostname}"),
        }
    }
}

impl From<Ipv4Addr> for StoreKey {
    fn from(address: Ipv4Addr) -> Self {
        StoreKey::Address(address.to_string())
    }
}

/// Hostnames recorded under one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreEntry {
    hostnames: Vec<String>,
    count: usize,
}

impl StoreEntry {
    fn new(hostname: String) -> Self {
        Self {
            hostnames: vec![hostname],
            count: 1,
        }
    }

    /// Hostnames in first-seen order. Re-observed names appear again.
    pub fn hostnames(&self) -> &[String] {
        &self.hostnames
    }

    /// Number of insertions recorded for this key.
    pub fn count(&self) -> usize {
        self.count
    }
}

/// Aggregation of resolution results keyed by address.
#[derive(Debug, Default)]
pub struct RecordStore {
    entries: BTreeMap<StoreKey, StoreEntry>,
}

impl RecordStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if `key` has a bucket.
    pub fn exists(&self, key: &StoreKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Creates a bucket for `key` holding `hostname`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::KeyExists` if the bucket already exists.
    pub fn create(&mut self, key: StoreKey, hostname: String) -> Result<(), StoreError> {
        if self.entries.contains_key(&key) {
            return Err(StoreError::KeyExists(key));
        }
        self.entries.insert(key, StoreEntry::new(hostname));
        Ok(())
    }

    /// Appends `hostname` to an existing bucket and bumps its count.
    ///
    /// The hostname is not checked for duplicates, so the count can grow
    /// from repeated observations of the same name.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::KeyMissing` if there is no bucket for `key`.
    pub fn append(&mut self, key: &StoreKey, hostname: String) -> Result<(), StoreError> {
        let entry = self
            .entries
            .get_mut(key)
            .ok_or_else(|| StoreError::KeyMissing(key.clone()))?;
        entry.hostnames.push(hostname);
        entry.count += 1;
        Ok(())
    }

    /// Removes a bucket, returning it if it existed.
    pub fn delete(&mut self, key: &StoreKey) -> Option<StoreEntry> {
        self.entries.remove(key)
    }

    /// Returns the bucket for `key`.
    pub fn get(&self, key: &StoreKey) -> Option<&StoreEntry> {
        self.entries.get(key)
    }

    /// Visits every bucket in key order.
    pub fn iterate<F>(&self, mut visit: F)
    where
        F: FnMut(&StoreKey, &[String], usize),
    {
        for (key, entry) in &self.entries {
            visit(key, &entry.hostnames, entry.count);
        }
    }

    /// Iterator over all buckets in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&StoreKey, &StoreEntry)> {
        self.entries.iter()
    }

    /// Number of buckets.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the store has no buckets.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Records one resolution event.
    ///
    /// Every address gets the hostname added to its bucket. A name without
    /// addresses goes into its own `CNAME:<host>` bucket and is never merged
    /// with address buckets.
    pub fn ingest(&mut self, event: ResolutionEvent) -> Result<(), StoreError> {
        let ResolutionEvent {
            hostname,
            addresses,
        } = event;

        if addresses.is_empty() {
            let key = StoreKey::Cname(hostname.clone());
            return self.create_or_append(key, hostname);
        }

        for address in addresses {
            self.create_or_append(StoreKey::Address(address), hostname.clone())?;
        }
        Ok(())
    }

    fn create_or_append(&mut self, key: StoreKey, hostname: String) -> Result<(), StoreError> {
        if self.exists(&key) {
            self.append(&key, hostname)
        } else {
            self.create(key, hostname)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(a: &str) -> StoreKey {
        StoreKey::Address(a.to_string())
    }

    #[test]
    fn test_create_then_exists() {
        let mut store = RecordStore::new();
        assert!(!store.exists(&addr("10.0.0.1")));
        store
            .create(addr("10.0.0.1"), "a.example.com".into())
            .unwrap();
        assert!(store.exists(&addr("10.0.0.1")));
        assert_eq!(store.get(&addr("10.0.0.1")).unwrap().count(), 1);
    }

    #[test]
    fn test_create_existing_key_fails() {
        let mut store = RecordStore::new();
        store
            .create(addr("10.0.0.1"), "a.example.com".into())
            .unwrap();
        let err = store
            .create(addr("10.0.0.1"), "b.example.com".into())
            .unwrap_err();
        assert_eq!(err, StoreError::KeyExists(addr("10.0.0.1")));
    }

    #[test]
    fn test_append_missing_key_fails() {
        let mut store = RecordStore::new();
        let err = store
            .append(&addr("10.0.0.2"), "a.example.com".into())
            .unwrap_err();
        assert_eq!(err, StoreError::KeyMissing(addr("10.0.0.2")));
        assert!(store.is_empty());
    }

    #[test]
    fn test_append_increments_count_by_one() {
        let mut store = RecordStore::new();
        let key = addr("10.0.0.3");
        store.create(key.clone(), "a.example.com".into()).unwrap();
        for (i, host) in ["b.example.com", "c.example.com", "a.example.com"]
            .into_iter()
            .enumerate()
        {
            store.append(&key, host.into()).unwrap();
            assert_eq!(store.get(&key).unwrap().count(), i + 2);
        }
        // Duplicates are kept and counted
        assert_eq!(
            store.get(&key).unwrap().hostnames(),
            ["a.example.com", "b.example.com", "c.example.com", "a.example.com"]
        );
    }

    #[test]
    fn test_delete_removes_bucket() {
        let mut store = RecordStore::new();
        store
            .create(addr("10.0.0.4"), "a.example.com".into())
            .unwrap();
        assert!(store.delete(&addr("10.0.0.4")).is_some());
        assert!(!store.exists(&addr("10.0.0.4")));
        assert!(store.delete(&addr("10.0.0.4")).is_none());
    }

    #[test]
    fn test_ingest_groups_by_address() {
        let mut store = RecordStore::new();
        store
            .ingest(ResolutionEvent::new(
                "a.example.com",
                vec!["10.0.0.1".into(), "10.0.0.2".into()],
            ))
            .unwrap();
        store
            .ingest(ResolutionEvent::new("b.example.com", vec!["10.0.0.1".into()]))
            .unwrap();

        assert_eq!(store.len(), 2);
        let shared = store.get(&addr("10.0.0.1")).unwrap();
        assert_eq!(shared.hostnames(), ["a.example.com", "b.example.com"]);
        assert_eq!(shared.count(), 2);
        assert_eq!(store.get(&addr("10.0.0.2")).unwrap().count(), 1);
    }

    #[test]
    fn test_ingest_cname_only_gets_own_bucket() {
        let mut store = RecordStore::new();
        store
            .ingest(ResolutionEvent::new("alias.example.com.", vec![]))
            .unwrap();
        store
            .ingest(ResolutionEvent::new("alias.example.com", vec![]))
            .unwrap();

        let key = StoreKey::Cname("alias.example.com".into());
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&key).unwrap().count(), 2);
    }

    #[test]
    fn test_iterate_visits_every_bucket_in_stable_order() {
        let mut store = RecordStore::new();
        for (host, ip) in [
            ("c.example.com", "10.0.0.3"),
            ("a.example.com", "10.0.0.1"),
            ("b.example.com", "10.0.0.2"),
        ] {
            store
                .ingest(ResolutionEvent::new(host, vec![ip.into()]))
                .unwrap();
        }

        let mut first = Vec::new();
        store.iterate(|key, _, _| first.push(key.to_string()));
        let mut second = Vec::new();
        store.iterate(|key, _, _| second.push(key.to_string()));
        assert_eq!(first.len(), 3);
        assert_eq!(first, second);
    }

    #[test]
    fn test_store_key_display_and_parse() {
        let cname = StoreKey::Cname("x.example.com".into());
        assert_eq!(cname.to_string(), "CNAME:x.example.com");
        assert_eq!(StoreKey::parse("CNAME:x.example.com"), cname);
        assert_eq!(StoreKey::parse("192.0.2.1"), addr("192.0.2.1"));
        assert_eq!(
            StoreKey::from(Ipv4Addr::new(192, 0, 2, 1)),
            addr("192.0.2.1")
        );
    }
}
