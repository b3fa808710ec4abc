//! Error type definitions.
//!
//! This module defines all error, soft-failure, and info types used throughout the application.

use std::path::PathBuf;

use log::SetLoggerError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

use crate::store::StoreKey;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the DNS resolver.
    #[error("DNS resolver initialization error: {0}")]
    DnsResolverError(String),

    /// Error reading or parsing a resolver list file.
    #[error("Resolver list error in {}: {message}", .path.display())]
    ResolverListError {
        /// File being loaded
        path: PathBuf,
        /// What went wrong
        message: String,
    },
}

/// Problems with the input file that abort a run before any parsing.
#[derive(Error, Debug)]
pub enum InputError {
    /// The input file exists but is empty.
    #[error("blank input file specified: {}", .0.display())]
    Blank(PathBuf),

    /// The input file does not exist.
    #[error("input file does not exist: {}", .0.display())]
    Missing(PathBuf),

    /// The input file could not be inspected.
    #[error("could not read input file {}: {source}", .path.display())]
    Unreadable {
        /// Input file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Failures while reading resolver output.
///
/// Any of these aborts the whole parse; malformed lines are never skipped.
#[derive(Error, Debug)]
pub enum ParseError {
    /// Reading from the underlying stream failed.
    #[error("could not read resolver output: {0}")]
    Io(#[from] std::io::Error),

    /// A structured line could not be decoded.
    #[error("could not decode resolver output line {line}: {source}")]
    Decode {
        /// 1-based line number
        line: usize,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },
}

/// Record store mutation errors (caller-discipline violations).
#[derive(Error, Debug, PartialEq, Eq)]
pub enum StoreError {
    /// `create` was called for a key that is already present.
    #[error("could not create new record: key {0} already exists")]
    KeyExists(StoreKey),

    /// `append` was called for a key that is not present.
    #[error("could not update record: key {0} does not exist")]
    KeyMissing(StoreKey),
}

/// Invalid option combinations.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Neither a hostname list nor raw resolver output was given.
    #[error("no input specified: use --list or --raw-input")]
    NoInput,

    /// Running the bulk resolver requires a resolvers file.
    #[error("--resolvers is required when resolving a hostname list")]
    MissingResolvers,

    /// A pool size of zero would never make progress.
    #[error("{0} must be greater than zero")]
    ZeroThreads(&'static str),
}

/// Failures while running the external bulk resolver.
#[derive(Error, Debug)]
pub enum MassdnsError {
    /// A temp file for stdout/stderr could not be created.
    #[error("could not create temp file for massdns {stream}: {source}")]
    TempFile {
        /// "stdout" or "stderr"
        stream: &'static str,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The binary could not be started or waited on.
    #[error("could not execute massdns: {0}")]
    Spawn(#[source] std::io::Error),

    /// The binary ran but exited unsuccessfully.
    #[error("massdns exited with {status}, see {}", stderr.display())]
    Failed {
        /// Exit status description
        status: String,
        /// Path of the captured stderr file
        stderr: PathBuf,
    },

    /// The run was cancelled before massdns finished.
    #[error("massdns execution cancelled")]
    Cancelled,
}

/// Why a per-item task produced nothing.
///
/// These are soft failures: they are logged and counted, never propagated as run errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// A sibling probe already confirmed the bucket as a wildcard.
    Cancelled,
    /// The wildcard probe itself failed; the bucket is kept.
    ProbeFailed(String),
    /// The trusted resolver returned an error.
    LookupFailed(String),
    /// The trusted resolver answered with neither A nor CNAME records.
    NoAnswer,
}

/// Result of one probe or verify task when it did not fail hard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome<T> {
    /// The task ran to completion.
    Completed(T),
    /// The item was skipped for the given reason.
    Skipped(SkipReason),
}

impl<T> ItemOutcome<T> {
    /// Returns `true` if the task completed.
    pub fn is_completed(&self) -> bool {
        matches!(self, ItemOutcome::Completed(_))
    }
}

/// Types of soft errors counted during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum ErrorType {
    /// A wildcard probe lookup failed
    WildcardProbeError,
    /// A trusted resolver lookup failed
    TrustedLookupError,
    /// A trusted resolver returned no A/CNAME answer
    TrustedNoAnswer,
}

/// Types of informational metrics counted during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum InfoType {
    /// A probe confirmed its bucket as wildcard
    WildcardConfirmed,
    /// Probe skipped because a sibling already confirmed
    ProbeSkipped,
    /// Hostname already emitted from another bucket
    DuplicateHostname,
    /// Hostname confirmed by a trusted resolver
    TrustedVerified,
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ErrorType {
    /// Returns a human-readable string representation of the error type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::WildcardProbeError => "Wildcard probe error",
            ErrorType::TrustedLookupError => "Trusted resolver lookup error",
            ErrorType::TrustedNoAnswer => "No answer from trusted resolver",
        }
    }
}

impl InfoType {
    /// Returns a human-readable string representation of the info type.
    pub fn as_str(&self) -> &'static str {
        match self {
            InfoType::WildcardConfirmed => "Wildcard confirmed",
            InfoType::ProbeSkipped => "Probe skipped (bucket already confirmed)",
            InfoType::DuplicateHostname => "Duplicate hostname",
            InfoType::TrustedVerified => "Verified by trusted resolver",
        }
    }
}

impl SkipReason {
    /// The error counter this reason feeds, if any.
    pub fn error_type(&self) -> Option<ErrorType> {
        match self {
            SkipReason::Cancelled => None,
            SkipReason::ProbeFailed(_) => Some(ErrorType::WildcardProbeError),
            SkipReason::LookupFailed(_) => Some(ErrorType::TrustedLookupError),
            SkipReason::NoAnswer => Some(ErrorType::TrustedNoAnswer),
        }
    }
}
