//! Run resources.
//!
//! Builds everything a run needs from a `Config`: output sinks, the wildcard
//! filter and the trusted verifier.

use std::sync::Arc;

use anyhow::{Context, Result};
use log::info;

use crate::config::{Config, WILDCARD_PROBE_THRESHOLD};
use crate::error_handling::ProcessingStats;
use crate::initialization::{init_resolver, load_resolvers};
use crate::output::{
    DnsTrustedVerifier, EmitOptions, OutputEmitter, OutputSinks, ResultHook, TrustedVerifier,
};
use crate::wildcard::{DnsWildcardProbe, FilterOptions, WildcardFilter, WildcardSet};

/// All resources initialized for one run.
pub struct RunResources {
    /// Soft error and info counters
    pub stats: Arc<ProcessingStats>,
    /// Wildcard filter, present when root domains are configured
    pub filter: Option<WildcardFilter>,
    /// Output emitter over the configured sinks
    pub emitter: OutputEmitter,
}

impl RunResources {
    /// Initializes sinks, probe and verifier for `config`.
    ///
    /// The output file is created (truncated) here, before any resolution
    /// work, so an unwritable path fails fast.
    ///
    /// # Errors
    ///
    /// Fails if the output file cannot be created, a resolver list cannot be
    /// loaded, or a resolver cannot be built.
    pub fn init(config: &Config, on_result: Option<ResultHook>) -> Result<Self> {
        let stats = Arc::new(ProcessingStats::new());

        let mut sinks = OutputSinks::new();
        if let Some(path) = &config.output {
            sinks
                .add_file(path)
                .with_context(|| format!("could not create output file {}", path.display()))?;
        }
        if !config.silent {
            sinks.add_console();
        }

        let filter = if config.domains.is_empty() {
            None
        } else {
            let servers = match &config.resolvers {
                Some(path) => load_resolvers(path).context("could not load resolvers")?,
                None => Vec::new(),
            };
            let resolver =
                init_resolver(&servers).context("Failed to initialize wildcard resolver")?;
            let probe = DnsWildcardProbe::new(resolver, &config.domains);
            Some(WildcardFilter::new(
                Arc::new(probe),
                Arc::new(WildcardSet::new()),
                Arc::clone(&stats),
                FilterOptions {
                    concurrency: config.wildcard_threads,
                    strict: config.strict_wildcard,
                    threshold: WILDCARD_PROBE_THRESHOLD,
                },
            ))
        };

        let mut emitter = OutputEmitter::new(
            Arc::new(sinks),
            EmitOptions {
                format: config.output_format(),
                concurrency: config.wildcard_threads,
            },
            Arc::clone(&stats),
        );
        if let Some(path) = &config.trusted_resolvers {
            info!("Trusted resolvers specified, verifying results");
            let servers = load_resolvers(path).context("could not load trusted resolvers")?;
            let resolver =
                init_resolver(&servers).context("Failed to initialize trusted resolver")?;
            let verifier: Arc<dyn TrustedVerifier> = Arc::new(DnsTrustedVerifier::new(resolver));
            emitter = emitter.with_verifier(verifier);
        }
        if let Some(hook) = on_result {
            emitter = emitter.with_result_hook(hook);
        }

        Ok(Self {
            stats,
            filter,
            emitter,
        })
    }
}
