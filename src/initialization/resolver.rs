//! DNS resolver initialization and resolver list loading.

use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::time::Duration;

use hickory_resolver::config::{
    NameServerConfig, NameServerConfigGroup, Protocol, ResolverConfig, ResolverOpts,
};
use hickory_resolver::TokioAsyncResolver;
use log::debug;

use crate::config::{DEFAULT_DNS_PORT, DNS_ATTEMPTS, DNS_TIMEOUT_SECS};
use crate::error_handling::InitializationError;

/// Initializes a DNS resolver over exactly `servers`.
///
/// Each server is queried over UDP first, then TCP. With an empty list the
/// default hickory configuration is used. Timeouts are kept short so random
/// wildcard probe names do not stall the probe pool.
///
/// # Errors
///
/// Returns `InitializationError::DnsResolverError` if a server address is
/// unusable (currently only the unspecified address).
pub fn init_resolver(servers: &[SocketAddr]) -> Result<TokioAsyncResolver, InitializationError> {
    let mut opts = ResolverOpts::default();
    opts.timeout = Duration::from_secs(DNS_TIMEOUT_SECS);
    opts.attempts = DNS_ATTEMPTS;
    // Names are always queried fully qualified
    opts.ndots = 0;

    if servers.is_empty() {
        return Ok(TokioAsyncResolver::tokio(ResolverConfig::default(), opts));
    }

    let mut name_servers = Vec::with_capacity(servers.len() * 2);
    for server in servers {
        if server.ip().is_unspecified() {
            return Err(InitializationError::DnsResolverError(format!(
                "unusable resolver address {server}"
            )));
        }
        name_servers.push(NameServerConfig::new(*server, Protocol::Udp));
        name_servers.push(NameServerConfig::new(*server, Protocol::Tcp));
    }

    let config = ResolverConfig::from_parts(
        None,
        vec![],
        NameServerConfigGroup::from(name_servers),
    );
    debug!("DNS resolver configured with {} servers", servers.len());
    Ok(TokioAsyncResolver::tokio(config, opts))
}

/// Parses one resolver entry: `ip` or `ip:port`.
///
/// IPv6 addresses with a port use the bracketed form (`[::1]:5353`).
pub fn parse_resolver(entry: &str) -> Option<SocketAddr> {
    let entry = entry.trim();
    if let Ok(addr) = entry.parse::<SocketAddr>() {
        return Some(addr);
    }
    entry
        .parse::<IpAddr>()
        .ok()
        .map(|ip| SocketAddr::new(ip, DEFAULT_DNS_PORT))
}

/// Loads a resolver list file.
///
/// One resolver per line; blank lines and `#` comments are skipped.
///
/// # Errors
///
/// Returns `InitializationError::ResolverListError` if the file cannot be read,
/// if a line is not a valid resolver, or if the file holds no resolvers.
pub fn load_resolvers(path: &Path) -> Result<Vec<SocketAddr>, InitializationError> {
    let list_error = |message: String| InitializationError::ResolverListError {
        path: path.to_path_buf(),
        message,
    };

    let contents = fs::read_to_string(path).map_err(|e| list_error(e.to_string()))?;

    let mut servers = Vec::new();
    for (index, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let server = parse_resolver(line)
            .ok_or_else(|| list_error(format!("invalid resolver on line {}: {line}", index + 1)))?;
        servers.push(server);
    }

    if servers.is_empty() {
        return Err(list_error("no resolvers found".to_string()));
    }
    Ok(servers)
}
