//! Configuration constants.
//!
//! Defaults shared by the CLI, the library `Config` and the individual phases.

/// Minimum number of hostnames a bucket needs before it is probed for wildcards
/// (strict mode probes every bucket regardless).
pub const WILDCARD_PROBE_THRESHOLD: usize = 5;

/// Default pool size for the wildcard probe and output phases
pub const DEFAULT_WILDCARD_THREADS: usize = 25;

/// Default concurrency passed to massdns via `-s`
pub const DEFAULT_MASSDNS_THREADS: usize = 10000;

/// Default massdns binary, looked up on `PATH`
pub const DEFAULT_MASSDNS_PATH: &str = "massdns";

/// Port used for resolver entries that do not name one
pub const DEFAULT_DNS_PORT: u16 = 53;

/// DNS query timeout in seconds for probe and trusted lookups
pub const DNS_TIMEOUT_SECS: u64 = 5;

/// Retry attempts for probe and trusted lookups
pub const DNS_ATTEMPTS: usize = 2;
