//! Statistics printing.

use log::info;
use strum::IntoEnumIterator;

use crate::error_handling::{ErrorType, InfoType, ProcessingStats};
use crate::pipeline::PipelineReport;

/// Prints error and info statistics to the log.
pub fn print_error_statistics(error_stats: &ProcessingStats) {
    let total_errors = error_stats.total_errors();
    let total_info = error_stats.total_info();

    if total_errors > 0 {
        info!("Error Counts ({} total):", total_errors);
        for error_type in ErrorType::iter() {
            let count = error_stats.get_error_count(error_type);
            if count > 0 {
                info!("   {}: {}", error_type.as_str(), count);
            }
        }
    }

    if total_info > 0 {
        info!("Info Counts ({} total):", total_info);
        for info_type in InfoType::iter() {
            let count = error_stats.get_info_count(info_type);
            if count > 0 {
                info!("   {}: {}", info_type.as_str(), count);
            }
        }
    }
}

/// Logs a short summary of a pipeline run.
pub fn print_run_summary(report: &PipelineReport, elapsed_seconds: f64) {
    if let Some(filter) = &report.filter {
        info!(
            "Wildcard filter: {} buckets probed, {} probes, {} buckets removed",
            filter.buckets_probed, filter.probes_submitted, filter.keys_removed
        );
    }
    info!(
        "✅ Processed {} event{} into {} bucket{}, wrote {} hostname{} in {:.1}s",
        report.events,
        if report.events == 1 { "" } else { "s" },
        report.buckets,
        if report.buckets == 1 { "" } else { "s" },
        report.emit.resolved,
        if report.emit.resolved == 1 { "" } else { "s" },
        elapsed_seconds
    );
}
