// Shared test helpers: fake probe, in-memory sink and massdns output builders.
#![allow(dead_code)]

use std::collections::HashSet;
use std::io::{self, Write};
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use dns_sift::{WildcardProbe, WildcardVerdict};
use futures::future::BoxFuture;
use futures::FutureExt;

/// Writer whose contents stay readable after it is moved into a sink.
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    /// Output lines, sorted (task completion order is not deterministic).
    pub fn lines(&self) -> Vec<String> {
        let bytes = self.0.lock().unwrap().clone();
        let mut lines: Vec<String> = String::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect();
        lines.sort();
        lines
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Probe that reports every hostname with a given prefix as a wildcard.
pub struct PrefixProbe {
    pub prefix: &'static str,
    pub sink: Ipv4Addr,
    pub calls: AtomicUsize,
}

impl PrefixProbe {
    pub fn new(prefix: &'static str, sink: Ipv4Addr) -> Self {
        Self {
            prefix,
            sink,
            calls: AtomicUsize::new(0),
        }
    }
}

impl WildcardProbe for PrefixProbe {
    fn lookup_host<'a>(
        &'a self,
        hostname: &'a str,
    ) -> BoxFuture<'a, anyhow::Result<WildcardVerdict>> {
        async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if hostname.starts_with(self.prefix) {
                Ok(WildcardVerdict {
                    is_wildcard: true,
                    wildcard_addresses: HashSet::from([self.sink]),
                })
            } else {
                Ok(WildcardVerdict::default())
            }
        }
        .boxed()
    }
}

/// Full-text massdns output for plain A answers.
pub fn raw_output(answers: &[(&str, &str)]) -> String {
    let mut out = String::new();
    for (hostname, address) in answers {
        out.push_str(";; Server: 10.1.1.1:53\n");
        out.push_str(";; ANSWER SECTION:\n");
        out.push_str(&format!("{hostname}. 60 IN A {address}\n"));
        out.push('\n');
    }
    out
}

/// Line-delimited JSON massdns output for plain A answers.
pub fn ndjson_output(answers: &[(&str, &str)]) -> String {
    let mut out = String::new();
    for (hostname, address) in answers {
        out.push_str(&format!(
            "{{\"name\":\"{hostname}.\",\"type\":\"A\",\"class\":\"IN\",\"status\":\"NOERROR\",\"data\":{{\"answers\":[{{\"ttl\":60,\"type\":\"A\",\"class\":\"IN\",\"name\":\"{hostname}.\",\"data\":\"{address}\"}}]}}}}\n"
        ));
    }
    out
}

/// The classic wildcard zone: six names on one sink address plus one real host.
pub const WILDCARD_ZONE: &[(&str, &str)] = &[
    ("w1.example.com", "10.0.0.5"),
    ("w2.example.com", "10.0.0.5"),
    ("w3.example.com", "10.0.0.5"),
    ("w4.example.com", "10.0.0.5"),
    ("w5.example.com", "10.0.0.5"),
    ("w6.example.com", "10.0.0.5"),
    ("app.example.com", "10.0.0.9"),
];
