//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `dns_sift` library that handles:
//! - Command-line argument parsing
//! - Logger initialization
//! - Ctrl-C handling
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;
use tokio_util::sync::CancellationToken;

use dns_sift::app::{shutdown_on_ctrl_c, stop_shutdown_listener};
use dns_sift::initialization::init_logger_with;
use dns_sift::{run_enumeration, Config, Opt};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments into Config
    let config = Config::from(Opt::parse());

    // Initialize logger based on config
    let log_level = config.log_level.clone();
    let log_format = config.log_format.clone();
    init_logger_with(log_level.into(), log_format).context("Failed to initialize logger")?;

    // Ctrl-C cancels the run, which kills a running massdns child
    let cancel = CancellationToken::new();
    let listener = shutdown_on_ctrl_c(cancel.clone());

    let result = run_enumeration(config, cancel.clone()).await;
    stop_shutdown_listener(cancel, listener).await;

    // stdout carries results, so the summary goes to stderr
    match result {
        Ok(report) => {
            eprintln!(
                "✅ Wrote {} hostname{} in {:.1}s",
                report.resolved(),
                if report.resolved() == 1 { "" } else { "s" },
                report.elapsed_seconds
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("dns_sift error: {:#}", e);
            process::exit(1);
        }
    }
}
