//! Bulk resolver output parsing.
//!
//! This module turns the output of the external bulk resolver into a lazy,
//! forward-only sequence of [`ResolutionEvent`]s. Two formats are supported:
//! - **Raw**: the multi-line full-text answer format, one record per
//!   answer-section block
//! - **Ndjson**: one JSON object per line
//!
//! Parsing is strictly sequential. The first read or decode error ends the
//! sequence and fails the whole parse.

mod ndjson;
mod raw;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error_handling::ParseError;

// Re-export public API
pub use ndjson::NdjsonRecords;
pub use raw::RawRecords;

/// One resolved name and the IPv4 addresses it resolved to.
///
/// An empty `addresses` list means the name only resolved to a CNAME chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionEvent {
    /// Queried name, trailing dot stripped
    pub hostname: String,
    /// A-record values in the order they were seen
    pub addresses: Vec<String>,
}

impl ResolutionEvent {
    /// Creates an event, normalizing the hostname.
    pub fn new(hostname: &str, addresses: Vec<String>) -> Self {
        Self {
            hostname: normalize_hostname(hostname).to_string(),
            addresses,
        }
    }
}

/// Output format of the bulk resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseMode {
    /// Multi-line full-text answer blocks
    #[default]
    Raw,
    /// One JSON object per line
    Ndjson,
}

/// Strips a single trailing dot from a DNS name.
pub fn normalize_hostname(name: &str) -> &str {
    name.strip_suffix('.').unwrap_or(name)
}

/// Lazy record sequence over either output format.
pub enum Records<R> {
    /// Raw text records
    Raw(RawRecords<R>),
    /// Line-delimited JSON records
    Ndjson(NdjsonRecords<R>),
}

impl<R: BufRead> Iterator for Records<R> {
    type Item = Result<ResolutionEvent, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Records::Raw(records) => records.next(),
            Records::Ndjson(records) => records.next(),
        }
    }
}

/// Creates a record sequence over `reader` in the given mode.
pub fn records<R: BufRead>(reader: R, mode: ParseMode) -> Records<R> {
    match mode {
        ParseMode::Raw => Records::Raw(RawRecords::new(reader)),
        ParseMode::Ndjson => Records::Ndjson(NdjsonRecords::new(reader)),
    }
}

/// Opens `path` and creates a buffered record sequence over it.
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be opened.
pub fn open_records(path: &Path, mode: ParseMode) -> Result<Records<BufReader<File>>, ParseError> {
    let file = File::open(path)?;
    Ok(records(BufReader::new(file), mode))
}

/// Parses `reader` and invokes `on_result` once per record.
///
/// Stops at the first parse error or the first error returned by the callback.
pub fn parse<R, F, E>(reader: R, mode: ParseMode, mut on_result: F) -> Result<(), E>
where
    R: BufRead,
    F: FnMut(ResolutionEvent) -> Result<(), E>,
    E: From<ParseError>,
{
    for event in records(reader, mode) {
        on_result(event?)?;
    }
    Ok(())
}
