//! Trusted-resolver verification.

use std::net::Ipv4Addr;
use std::sync::Arc;

use anyhow::Context;
use futures::future::BoxFuture;
use futures::FutureExt;
use hickory_resolver::error::ResolveErrorKind;
use hickory_resolver::proto::rr::{RData, RecordType};
use hickory_resolver::TokioAsyncResolver;

use crate::parse::normalize_hostname;

/// Answer of a trusted resolver for one hostname.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerifiedResponse {
    /// Queried hostname
    pub host: String,
    /// A records in the answer
    pub a: Vec<Ipv4Addr>,
    /// CNAME targets in the answer, trailing dot stripped
    pub cname: Vec<String>,
}

impl VerifiedResponse {
    /// Returns `true` if the answer holds an A or a CNAME record.
    pub fn has_answer(&self) -> bool {
        !self.a.is_empty() || !self.cname.is_empty()
    }
}

/// Callback invoked once per hostname confirmed by a trusted resolver.
pub type ResultHook = Arc<dyn Fn(&VerifiedResponse) + Send + Sync>;

/// Second, independent resolution pass restricted to trusted resolvers.
pub trait TrustedVerifier: Send + Sync {
    /// Queries `hostname` once.
    fn query_one<'a>(&'a self, hostname: &'a str)
        -> BoxFuture<'a, anyhow::Result<VerifiedResponse>>;
}

/// `TrustedVerifier` backed by a hickory resolver.
pub struct DnsTrustedVerifier {
    resolver: TokioAsyncResolver,
}

impl DnsTrustedVerifier {
    /// Wraps a resolver that only talks to trusted servers.
    pub fn new(resolver: TokioAsyncResolver) -> Self {
        Self { resolver }
    }

    async fn query(&self, hostname: &str) -> anyhow::Result<VerifiedResponse> {
        let host = normalize_hostname(hostname);
        let mut response = VerifiedResponse {
            host: host.to_string(),
            ..VerifiedResponse::default()
        };

        let lookup = match self.resolver.lookup(format!("{host}."), RecordType::A).await {
            Ok(lookup) => lookup,
            Err(e) if matches!(e.kind(), ResolveErrorKind::NoRecordsFound { .. }) => {
                return Ok(response)
            }
            Err(e) => return Err(e).with_context(|| format!("trusted lookup failed for {host}")),
        };

        for record in lookup.record_iter() {
            match record.data() {
                Some(RData::A(a)) => response.a.push(a.0),
                Some(RData::CNAME(cname)) => response
                    .cname
                    .push(normalize_hostname(&cname.0.to_utf8()).to_string()),
                _ => {}
            }
        }
        Ok(response)
    }
}

impl TrustedVerifier for DnsTrustedVerifier {
    fn query_one<'a>(
        &'a self,
        hostname: &'a str,
    ) -> BoxFuture<'a, anyhow::Result<VerifiedResponse>> {
        self.query(hostname).boxed()
    }
}
