//! Wildcard probing through a hickory resolver.

use std::collections::{HashMap, HashSet};
use std::net::Ipv4Addr;
use std::sync::{Mutex, PoisonError};

use anyhow::Context;
use futures::future::BoxFuture;
use futures::FutureExt;
use hickory_resolver::error::ResolveErrorKind;
use hickory_resolver::TokioAsyncResolver;
use log::debug;

use super::{WildcardProbe, WildcardVerdict};
use crate::parse::normalize_hostname;

/// Probes hostnames by comparing their answers with answers for random
/// sibling names under the same parents.
///
/// Random-name answers are cached per parent name, so each parent is probed
/// once per run no matter how many hostnames sit under it.
pub struct DnsWildcardProbe {
    resolver: TokioAsyncResolver,
    domains: Vec<String>,
    level_cache: Mutex<HashMap<String, HashSet<Ipv4Addr>>>,
}

impl DnsWildcardProbe {
    /// Creates a probe for hostnames under `domains`.
    pub fn new(resolver: TokioAsyncResolver, domains: &[String]) -> Self {
        let domains = domains
            .iter()
            .map(|d| normalize_hostname(d.trim()).to_ascii_lowercase())
            .filter(|d| !d.is_empty())
            .collect();
        Self {
            resolver,
            domains,
            level_cache: Mutex::new(HashMap::new()),
        }
    }

    async fn resolve_a(&self, name: &str) -> anyhow::Result<Vec<Ipv4Addr>> {
        match self.resolver.ipv4_lookup(format!("{name}.")).await {
            Ok(lookup) => Ok(lookup.iter().map(|a| a.0).collect()),
            Err(e) if matches!(e.kind(), ResolveErrorKind::NoRecordsFound { .. }) => Ok(Vec::new()),
            Err(e) => Err(e).with_context(|| format!("could not resolve {name}")),
        }
    }

    /// Answers for a random name directly under `level`.
    async fn level_answers(&self, level: &str) -> anyhow::Result<HashSet<Ipv4Addr>> {
        let cached = self
            .level_cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(level)
            .cloned();
        if let Some(answers) = cached {
            return Ok(answers);
        }

        let random_name = format!("{:016x}.{level}", rand::random::<u64>());
        let answers: HashSet<Ipv4Addr> = self.resolve_a(&random_name).await?.into_iter().collect();
        debug!("Random probe {random_name} answered {:?}", answers);

        self.level_cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(level.to_string(), answers.clone());
        Ok(answers)
    }

    async fn probe(&self, hostname: &str) -> anyhow::Result<WildcardVerdict> {
        let host = normalize_hostname(hostname).to_ascii_lowercase();

        let mut wildcard_addresses = HashSet::new();
        for level in probe_levels(&host, &self.domains) {
            wildcard_addresses.extend(self.level_answers(&level).await?);
        }

        let own = self.resolve_a(&host).await?;
        let is_wildcard = own.iter().any(|a| wildcard_addresses.contains(a));

        Ok(WildcardVerdict {
            is_wildcard,
            wildcard_addresses,
        })
    }
}

impl WildcardProbe for DnsWildcardProbe {
    fn lookup_host<'a>(
        &'a self,
        hostname: &'a str,
    ) -> BoxFuture<'a, anyhow::Result<WildcardVerdict>> {
        self.probe(hostname).boxed()
    }
}

/// Parent names under which a random label is resolved for `host`.
///
/// With a matching root domain (the longest of `domains` that `host` equals
/// or ends with) this is the root itself plus every label suffix of the
/// subdomain part joined to the root. For `a.b.example.com` under
/// `example.com`: `example.com`, `a.b.example.com`, `b.example.com`.
///
/// Without a matching root the immediate parent of `host` is used.
pub fn probe_levels(host: &str, domains: &[String]) -> Vec<String> {
    let root = domains
        .iter()
        .filter(|d| host == d.as_str() || host.ends_with(&format!(".{d}")))
        .max_by_key(|d| d.len());

    let Some(root) = root else {
        return host
            .split_once('.')
            .filter(|(_, parent)| !parent.is_empty())
            .map(|(_, parent)| vec![parent.to_string()])
            .unwrap_or_default();
    };

    let mut levels = vec![root.clone()];
    let subdomain = host
        .strip_suffix(root.as_str())
        .unwrap_or_default()
        .trim_end_matches('.');
    if subdomain.is_empty() {
        return levels;
    }

    let labels: Vec<&str> = subdomain.split('.').collect();
    for i in 0..labels.len() {
        levels.push(format!("{}.{root}", labels[i..].join(".")));
    }
    levels
}
