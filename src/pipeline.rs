//! Parse, aggregate, filter and emit, over any buffered source.

use std::io::BufRead;
use std::time::Instant;

use anyhow::{Context, Result};
use log::info;

use crate::output::{EmitReport, OutputEmitter};
use crate::parse::{records, ParseMode};
use crate::store::RecordStore;
use crate::wildcard::{FilterReport, WildcardFilter};

/// Totals of one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineReport {
    /// Resolution events read from the source
    pub events: usize,
    /// Buckets in the store after parsing
    pub buckets: usize,
    /// Wildcard filter summary, when filtering ran
    pub filter: Option<FilterReport>,
    /// Output summary
    pub emit: EmitReport,
}

/// Reads every resolution event from `reader` into a new store.
///
/// Returns the store and the number of events read.
///
/// # Errors
///
/// Fails on the first read or decode error; nothing parsed so far is kept.
pub fn build_store<R: BufRead>(reader: R, mode: ParseMode) -> Result<(RecordStore, usize)> {
    let mut store = RecordStore::new();
    let mut events = 0;
    for event in records(reader, mode) {
        let event = event.context("could not parse massdns output")?;
        store
            .ingest(event)
            .context("could not add record to store")?;
        events += 1;
    }
    Ok((store, events))
}

/// One end-to-end pass over resolver output.
pub struct Pipeline {
    mode: ParseMode,
    filter: Option<WildcardFilter>,
    emitter: OutputEmitter,
}

impl Pipeline {
    /// Creates a pipeline without wildcard filtering.
    pub fn new(mode: ParseMode, emitter: OutputEmitter) -> Self {
        Self {
            mode,
            filter: None,
            emitter,
        }
    }

    /// Runs `filter` between aggregation and output.
    pub fn with_filter(mut self, filter: WildcardFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Parses `reader`, removes wildcard buckets and writes what survives.
    ///
    /// # Errors
    ///
    /// Returns parse failures and sink write failures. Probe and verification
    /// failures are soft and only show up in the statistics.
    pub async fn run<R: BufRead>(&self, reader: R) -> Result<PipelineReport> {
        info!("Started parsing massdns output");
        let now = Instant::now();
        let (mut store, events) = build_store(reader, self.mode)?;
        info!(
            "Massdns output parsing completed in {:.2}s ({} events, {} buckets)",
            now.elapsed().as_secs_f64(),
            events,
            store.len()
        );
        let buckets = store.len();

        let filter = match &self.filter {
            Some(filter) => {
                info!("Started removing wildcard records");
                let now = Instant::now();
                let report = filter.filter(&mut store).await;
                info!(
                    "Wildcard removal completed in {:.2}s ({} buckets removed)",
                    now.elapsed().as_secs_f64(),
                    report.keys_removed
                );
                Some(report)
            }
            None => None,
        };

        info!("Finished enumeration, started writing output");
        let now = Instant::now();
        let emit = self
            .emitter
            .emit(&store)
            .await
            .context("could not write output")?;
        info!("Output written in {:.2}s", now.elapsed().as_secs_f64());

        Ok(PipelineReport {
            events,
            buckets,
            filter,
            emit,
        })
    }
}
