//! Run orchestration: input checks, massdns, pipeline and statistics.

mod resources;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use log::info;
use tokio_util::sync::CancellationToken;

use crate::app::{print_error_statistics, print_run_summary};
use crate::config::Config;
use crate::error_handling::ConfigError;
use crate::massdns::{check_input_file, run_massdns, MassdnsOptions};
use crate::output::ResultHook;
use crate::pipeline::{Pipeline, PipelineReport};

pub use resources::RunResources;

/// Results of an enumeration run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Pipeline totals
    pub pipeline: PipelineReport,
    /// Seconds spent in massdns, when it ran
    pub massdns_seconds: Option<f64>,
    /// Elapsed time in seconds
    pub elapsed_seconds: f64,
}

impl RunReport {
    /// Number of hostnames written to the sinks.
    pub fn resolved(&self) -> usize {
        self.pipeline.emit.resolved
    }
}

/// Runs an enumeration with the provided configuration.
///
/// Either parses existing massdns output (`raw_input`) or runs massdns over
/// the hostname list first, then aggregates, removes wildcards (when root
/// domains are configured) and writes the surviving hostnames.
///
/// # Errors
///
/// This function will return an error if:
/// - The configuration is invalid
/// - The input file is missing or blank
/// - massdns fails or is cancelled
/// - The resolver output cannot be parsed
/// - An output sink cannot be created or written
///
/// # Example
///
/// ```no_run
/// use dns_sift::{run_enumeration, Config};
/// use std::path::PathBuf;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config {
///     domains: vec!["example.com".to_string()],
///     raw_input: Some(PathBuf::from("massdns.txt")),
///     ..Default::default()
/// };
/// let report = run_enumeration(config, CancellationToken::new()).await?;
/// println!("{} hostnames", report.resolved());
/// # Ok(())
/// # }
/// ```
pub async fn run_enumeration(config: Config, cancel: CancellationToken) -> Result<RunReport> {
    run_enumeration_with_hook(config, cancel, None).await
}

/// Same as [`run_enumeration`], calling `on_result` for every hostname a
/// trusted resolver confirms.
///
/// # Errors
///
/// See [`run_enumeration`].
pub async fn run_enumeration_with_hook(
    config: Config,
    cancel: CancellationToken,
    on_result: Option<ResultHook>,
) -> Result<RunReport> {
    let start_time = Instant::now();
    config.validate().context("Invalid configuration")?;

    let input = config
        .raw_input
        .as_ref()
        .or(config.list.as_ref())
        .ok_or(ConfigError::NoInput)?;
    check_input_file(input)?;

    let resources = RunResources::init(&config, on_result)?;
    let mut pipeline = Pipeline::new(config.parse_mode(), resources.emitter);
    if let Some(filter) = resources.filter {
        pipeline = pipeline.with_filter(filter);
    }

    let (report, massdns_seconds) = match &config.raw_input {
        Some(raw) => {
            info!("Parsing existing massdns output {}", raw.display());
            (run_file(&pipeline, raw).await?, None)
        }
        None => {
            let options = massdns_options(&config, input)?;
            if config.domains.is_empty() {
                info!("Executing massdns");
            } else {
                info!("Executing massdns on {}", config.domains.join(", "));
            }
            let run = run_massdns(&options, cancel)
                .await
                .context("could not execute massdns")?;
            info!("massdns output file: {}", run.stdout.display());
            let report = run_file(&pipeline, &run.stdout).await?;
            (report, Some(run.took.as_secs_f64()))
        }
    };

    let elapsed_seconds = start_time.elapsed().as_secs_f64();
    print_error_statistics(&resources.stats);
    print_run_summary(&report, elapsed_seconds);

    Ok(RunReport {
        pipeline: report,
        massdns_seconds,
        elapsed_seconds,
    })
}

async fn run_file(pipeline: &Pipeline, path: &Path) -> Result<PipelineReport> {
    let file = File::open(path)
        .with_context(|| format!("could not open massdns output {}", path.display()))?;
    pipeline.run(BufReader::new(file)).await
}

fn massdns_options(config: &Config, input: &Path) -> Result<MassdnsOptions> {
    let resolvers = config
        .resolvers
        .clone()
        .context("--resolvers is required when resolving a hostname list")?;
    Ok(MassdnsOptions {
        massdns_path: config.massdns_path.clone(),
        resolvers,
        input: input.to_path_buf(),
        threads: config.threads,
        mode: config.parse_mode(),
        extra_args: config.massdns_cmd.clone(),
        temp_dir: config.temp_dir.clone(),
    })
}
