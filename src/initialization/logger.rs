//! Logger initialization.
//!
//! Logs go to stderr so stdout stays a clean hostname list. Every line is
//! tagged with the phase that produced it (`parse`, `wildcard`, `output`,
//! `massdns`, ...), taken from the first module below the crate root.

use std::io::Write;

use crate::config::LogFormat;
use crate::error_handling::InitializationError;
use colored::*;
use log::{Level, LevelFilter};

const CRATE_TARGET: &str = "dns_sift";

/// Initializes the global logger.
///
/// `RUST_LOG` is read first; `level` then overrides the default and this
/// crate's own directive. Resolver library chatter (one line per random
/// wildcard name that fails to resolve) is capped at warnings.
///
/// ```bash
/// RUST_LOG=hickory_resolver=debug dns_sift -d example.com --raw-input massdns.txt
/// ```
///
/// # Errors
///
/// Returns `InitializationError::LoggerError` if a logger is already installed.
pub fn init_logger_with(level: LevelFilter, format: LogFormat) -> Result<(), InitializationError> {
    logger_builder(level, format)
        .try_init()
        .map_err(InitializationError::from)
}

fn logger_builder(level: LevelFilter, format: LogFormat) -> env_logger::Builder {
    let mut builder = env_logger::Builder::from_default_env();
    builder
        .filter_level(level)
        .filter_module("hickory_proto", level.min(LevelFilter::Error))
        .filter_module("hickory_resolver", level.min(LevelFilter::Warn))
        .filter_module(CRATE_TARGET, level)
        .target(env_logger::Target::Stderr);

    match format {
        LogFormat::Json => {
            builder.format(|buf, record| {
                let line = json_line(
                    chrono::Utc::now().timestamp_millis(),
                    record.level(),
                    record.target(),
                    &record.args().to_string(),
                );
                writeln!(buf, "{line}")
            });
        }
        LogFormat::Plain => {
            builder.format(|buf, record| {
                let level = record.level();
                let label = match level {
                    Level::Error => level.as_str().red(),
                    Level::Warn => level.as_str().yellow(),
                    Level::Info => level.as_str().green(),
                    Level::Debug | Level::Trace => level.as_str().dimmed(),
                };
                writeln!(
                    buf,
                    "[{}] {} {}",
                    phase_of(record.target()).cyan(),
                    label,
                    record.args()
                )
            });
        }
    }

    builder
}

/// Phase label for a log target.
///
/// `dns_sift::wildcard::detector` is `wildcard`; targets outside this crate
/// are labelled with their crate name.
fn phase_of(target: &str) -> &str {
    let path = target
        .strip_prefix(CRATE_TARGET)
        .and_then(|rest| rest.strip_prefix("::"))
        .unwrap_or(target);
    path.split("::").next().unwrap_or(path)
}

fn json_line(ts_millis: i64, level: Level, target: &str, msg: &str) -> String {
    serde_json::json!({
        "ts": ts_millis,
        "level": level.as_str(),
        "phase": phase_of(target),
        "target": target,
        "msg": msg,
    })
    .to_string()
}
