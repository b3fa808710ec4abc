//! massdns invocation.
//!
//! Runs the bulk resolver over a hostname list with its output captured in
//! temp files, which the pipeline then parses.

mod input;

use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use tempfile::{Builder, TempPath};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

use crate::error_handling::MassdnsError;
use crate::parse::ParseMode;

pub use input::check_input_file;

/// Everything needed to run massdns once.
#[derive(Debug, Clone)]
pub struct MassdnsOptions {
    /// massdns binary
    pub massdns_path: PathBuf,
    /// Resolver list (`-r`)
    pub resolvers: PathBuf,
    /// Hostnames to resolve
    pub input: PathBuf,
    /// Concurrent lookups (`-s`)
    pub threads: usize,
    /// Output format to request
    pub mode: ParseMode,
    /// Extra arguments, split on whitespace
    pub extra_args: Option<String>,
    /// Directory for the stdout/stderr temp files
    pub temp_dir: Option<PathBuf>,
}

/// Captured output of a finished massdns run.
///
/// The temp files are removed when this value is dropped.
#[derive(Debug)]
pub struct MassdnsRun {
    /// Captured stdout (the resolution results)
    pub stdout: TempPath,
    /// Captured stderr
    pub stderr: TempPath,
    /// Wall time of the run
    pub took: Duration,
}

/// Builds the massdns argument list.
pub fn build_args(options: &MassdnsOptions) -> Vec<String> {
    let output_flag = match options.mode {
        ParseMode::Raw => "F",
        ParseMode::Ndjson => "J",
    };

    let mut args = vec![
        "-r".to_string(),
        options.resolvers.display().to_string(),
        "-o".to_string(),
        output_flag.to_string(),
        "--retry".to_string(),
        "REFUSED".to_string(),
        "--retry".to_string(),
        "SERVFAIL".to_string(),
        "-t".to_string(),
        "A".to_string(),
        options.input.display().to_string(),
        "-s".to_string(),
        options.threads.to_string(),
    ];
    if let Some(extra) = &options.extra_args {
        args.extend(extra.split_whitespace().map(str::to_string));
    }
    args
}

fn temp_file(
    options: &MassdnsOptions,
    stream: &'static str,
) -> Result<(std::fs::File, TempPath), MassdnsError> {
    let prefix = format!("massdns-{stream}-");
    let mut builder = Builder::new();
    builder.prefix(&prefix);
    let file = match &options.temp_dir {
        Some(dir) => builder.tempfile_in(dir),
        None => builder.tempfile(),
    }
    .map_err(|source| MassdnsError::TempFile { stream, source })?;
    Ok(file.into_parts())
}

/// Runs massdns and waits for it to exit.
///
/// Cancelling `cancel` kills the child process.
///
/// # Errors
///
/// Returns `MassdnsError::Failed` (with the kept stderr file) on a non-zero
/// exit, `MassdnsError::Cancelled` if the token fires first, and
/// `TempFile`/`Spawn` errors for setup failures.
pub async fn run_massdns(
    options: &MassdnsOptions,
    cancel: CancellationToken,
) -> Result<MassdnsRun, MassdnsError> {
    let start = Instant::now();
    let (stdout_file, stdout) = temp_file(options, "stdout")?;
    let (stderr_file, stderr) = temp_file(options, "stderr")?;

    let args = build_args(options);
    debug!("Arguments for massdns: {:?}", args);

    let mut child = Command::new(&options.massdns_path)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::from(stdout_file))
        .stderr(Stdio::from(stderr_file))
        .kill_on_drop(true)
        .spawn()
        .map_err(MassdnsError::Spawn)?;

    let status: ExitStatus = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            if let Err(e) = child.kill().await {
                warn!("Failed to kill massdns: {e}");
            }
            return Err(MassdnsError::Cancelled);
        }
        status = child.wait() => status.map_err(MassdnsError::Spawn)?,
    };

    if !status.success() {
        let stderr = stderr.keep().unwrap_or_else(|e| e.path.to_path_buf());
        return Err(MassdnsError::Failed {
            status: status.to_string(),
            stderr,
        });
    }

    let took = start.elapsed();
    info!("massdns execution took {:.2}s", took.as_secs_f64());
    Ok(MassdnsRun {
        stdout,
        stderr,
        took,
    })
}
