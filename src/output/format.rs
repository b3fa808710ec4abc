//! Output line formatting.

use serde_json::json;

/// Output line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// One hostname per line
    #[default]
    Plain,
    /// One `{"hostname": ...}` object per line
    Json,
}

/// Formats one hostname as a newline-terminated output line.
pub fn format_hostname(hostname: &str, format: OutputFormat) -> String {
    match format {
        OutputFormat::Plain => format!("{hostname}\n"),
        OutputFormat::Json => format!("{}\n", json!({ "hostname": hostname })),
    }
}
