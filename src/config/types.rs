//! Configuration types.
//!
//! This module defines the library `Config` (no CLI dependencies) and the
//! logging enums shared with the CLI.

use std::path::PathBuf;

use clap::ValueEnum;

use crate::config::constants::{
    DEFAULT_MASSDNS_PATH, DEFAULT_MASSDNS_THREADS, DEFAULT_WILDCARD_THREADS,
};
use crate::error_handling::ConfigError;
use crate::output::OutputFormat;
use crate::parse::ParseMode;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// Controls how log messages are formatted:
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Library configuration (no CLI dependencies).
///
/// # Examples
///
/// ```no_run
/// use dns_sift::Config;
/// use std::path::PathBuf;
///
/// let config = Config {
///     domains: vec!["example.com".to_string()],
///     raw_input: Some(PathBuf::from("massdns.txt")),
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Root domains used for wildcard probing; empty disables wildcard removal
    pub domains: Vec<String>,

    /// Hostnames to resolve with massdns
    pub list: Option<PathBuf>,

    /// Existing massdns output to parse instead of running massdns
    pub raw_input: Option<PathBuf>,

    /// Resolver list handed to massdns
    pub resolvers: Option<PathBuf>,

    /// Resolver list for the trusted verification pass
    pub trusted_resolvers: Option<PathBuf>,

    /// massdns binary
    pub massdns_path: PathBuf,

    /// Extra massdns arguments, split on whitespace
    pub massdns_cmd: Option<String>,

    /// massdns concurrency (`-s`)
    pub threads: usize,

    /// Pool size for wildcard probes and output tasks
    pub wildcard_threads: usize,

    /// Probe every bucket, not just the large ones
    pub strict_wildcard: bool,

    /// Run massdns with ndjson output and parse it as such
    pub ndjson: bool,

    /// Emit `{"hostname": ...}` lines instead of bare hostnames
    pub json: bool,

    /// Output file (created or truncated)
    pub output: Option<PathBuf>,

    /// Directory for massdns temp files; system default when unset
    pub temp_dir: Option<PathBuf>,

    /// Do not write results to stdout
    pub silent: bool,

    /// Log level
    pub log_level: LogLevel,

    /// Log format
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            domains: Vec::new(),
            list: None,
            raw_input: None,
            resolvers: None,
            trusted_resolvers: None,
            massdns_path: PathBuf::from(DEFAULT_MASSDNS_PATH),
            massdns_cmd: None,
            threads: DEFAULT_MASSDNS_THREADS,
            wildcard_threads: DEFAULT_WILDCARD_THREADS,
            strict_wildcard: false,
            ndjson: false,
            json: false,
            output: None,
            temp_dir: None,
            silent: false,
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
        }
    }
}

impl Config {
    /// Checks option combinations before any work starts.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if no input is given, if a hostname list is given
    /// without resolvers, or if a pool size is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.list.is_none() && self.raw_input.is_none() {
            return Err(ConfigError::NoInput);
        }
        if self.raw_input.is_none() && self.resolvers.is_none() {
            return Err(ConfigError::MissingResolvers);
        }
        if self.threads == 0 {
            return Err(ConfigError::ZeroThreads("--threads"));
        }
        if self.wildcard_threads == 0 {
            return Err(ConfigError::ZeroThreads("--wildcard-threads"));
        }
        Ok(())
    }

    /// Format of the resolver output being parsed.
    pub fn parse_mode(&self) -> ParseMode {
        if self.ndjson {
            ParseMode::Ndjson
        } else {
            ParseMode::Raw
        }
    }

    /// Format of the emitted lines.
    pub fn output_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Plain
        }
    }
}
