//! Main application helpers.
//!
//! This module provides shutdown handling and statistics printing used by the
//! run orchestration and the CLI binary.

pub mod shutdown;
pub mod statistics;

// Re-export public API
pub use shutdown::{shutdown_on_ctrl_c, stop_shutdown_listener};
pub use statistics::{print_error_statistics, print_run_summary};
