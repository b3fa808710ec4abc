//! dns_sift library: post-processing for bulk DNS resolution output
//!
//! This library turns massdns output into a clean hostname list. Answers are
//! grouped by IP address (or CNAME target), buckets that only exist because of
//! wildcard DNS are probed and removed, and every surviving hostname is
//! written once, optionally after re-verification against trusted resolvers.
//!
//! # Example
//!
//! ```no_run
//! use dns_sift::{run_enumeration, Config};
//! use tokio_util::sync::CancellationToken;
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let config = Config {
//!     domains: vec!["example.com".to_string()],
//!     list: Some(std::path::PathBuf::from("hosts.txt")),
//!     resolvers: Some(std::path::PathBuf::from("resolvers.txt")),
//!     ..Default::default()
//! };
//!
//! let report = run_enumeration(config, CancellationToken::new()).await?;
//! println!("{} hostnames written", report.resolved());
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

#![warn(missing_docs)]

pub mod app;
pub mod config;
pub mod error_handling;
pub mod initialization;
pub mod massdns;
pub mod output;
pub mod parse;
pub mod pipeline;
mod run;
pub mod store;
pub mod wildcard;

// Re-export public API
pub use config::{Config, LogFormat, LogLevel, Opt};
pub use error_handling::{
    ConfigError, ErrorType, InfoType, InitializationError, InputError, MassdnsError, ParseError,
    ProcessingStats, StoreError,
};
pub use output::{OutputFormat, OutputSinks, VerifiedResponse};
pub use parse::{ParseMode, ResolutionEvent};
pub use pipeline::{Pipeline, PipelineReport};
pub use run::{run_enumeration, run_enumeration_with_hook, RunReport, RunResources};
pub use store::{RecordStore, StoreKey};
pub use wildcard::{WildcardFilter, WildcardProbe, WildcardSet, WildcardVerdict};
