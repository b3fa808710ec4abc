//! Command-line options.

use std::path::PathBuf;

use clap::Parser;

use crate::config::constants::{
    DEFAULT_MASSDNS_PATH, DEFAULT_MASSDNS_THREADS, DEFAULT_WILDCARD_THREADS,
};
use crate::config::types::{Config, LogFormat, LogLevel};

/// Command-line options.
///
/// Converted into a library [`Config`] with `Config::from(opt)`.
///
/// # Examples
///
/// ```bash
/// # Resolve a hostname list and strip wildcard answers
/// dns_sift -d example.com -l hosts.txt -r resolvers.txt
///
/// # Post-process existing massdns output, JSON lines to a file
/// dns_sift -d example.com --raw-input massdns.txt --json -o out.jsonl
/// ```
#[derive(Debug, Parser)]
#[command(
    name = "dns_sift",
    about = "Filters bulk DNS resolution output: groups hostnames by answer, removes wildcard matches and prints what is left."
)]
pub struct Opt {
    /// Root domain used for wildcard probing (repeatable)
    #[arg(short = 'd', long = "domain")]
    pub domains: Vec<String>,

    /// File of hostnames to resolve with massdns
    #[arg(short = 'l', long, value_parser)]
    pub list: Option<PathBuf>,

    /// Existing massdns output to parse instead of running massdns
    #[arg(long, value_parser)]
    pub raw_input: Option<PathBuf>,

    /// Resolver list for massdns (one ip or ip:port per line)
    #[arg(short = 'r', long, value_parser)]
    pub resolvers: Option<PathBuf>,

    /// Resolver list for re-verifying every output hostname
    #[arg(long, value_parser)]
    pub trusted_resolvers: Option<PathBuf>,

    /// Path to the massdns binary
    #[arg(long, value_parser, default_value = DEFAULT_MASSDNS_PATH)]
    pub massdns_path: PathBuf,

    /// Extra arguments appended to the massdns command line
    #[arg(long, allow_hyphen_values = true)]
    pub massdns_cmd: Option<String>,

    /// Number of concurrent massdns lookups
    #[arg(short = 't', long, default_value_t = DEFAULT_MASSDNS_THREADS)]
    pub threads: usize,

    /// Number of concurrent wildcard probes and output tasks
    #[arg(long, default_value_t = DEFAULT_WILDCARD_THREADS)]
    pub wildcard_threads: usize,

    /// Probe every answer bucket for wildcards, not only large ones
    #[arg(long)]
    pub strict_wildcard: bool,

    /// Use massdns ndjson output
    #[arg(long)]
    pub ndjson: bool,

    /// Write results as JSON lines
    #[arg(long)]
    pub json: bool,

    /// File to write results to
    #[arg(short = 'o', long, value_parser)]
    pub output: Option<PathBuf>,

    /// Directory for massdns temp files
    #[arg(long, value_parser)]
    pub temp_dir: Option<PathBuf>,

    /// Do not print results to stdout
    #[arg(long)]
    pub silent: bool,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,
}

impl From<Opt> for Config {
    fn from(opt: Opt) -> Self {
        Self {
            domains: opt.domains,
            list: opt.list,
            raw_input: opt.raw_input,
            resolvers: opt.resolvers,
            trusted_resolvers: opt.trusted_resolvers,
            massdns_path: opt.massdns_path,
            massdns_cmd: opt.massdns_cmd,
            threads: opt.threads,
            wildcard_threads: opt.wildcard_threads,
            strict_wildcard: opt.strict_wildcard,
            ndjson: opt.ndjson,
            json: opt.json,
            output: opt.output,
            temp_dir: opt.temp_dir,
            silent: opt.silent,
            log_level: opt.log_level,
            log_format: opt.log_format,
        }
    }
}
