//! Error handling and processing statistics.
//!
//! This module provides:
//! - Hard-failure error types (parse, store, input, config, resolver invocation)
//! - Soft-failure outcomes for per-item probe and verify tasks
//! - Processing statistics tracking (soft errors, info metrics)
//!
//! Hard failures abort the run. Soft failures are logged, counted, and the
//! affected item is skipped.

mod stats;
mod types;

// Re-export public API
pub use stats::ProcessingStats;
pub use types::{
    ConfigError, ErrorType, InfoType, InitializationError, InputError, ItemOutcome, MassdnsError,
    ParseError, SkipReason, StoreError,
};
