//! Result output.
//!
//! Walks the surviving store buckets, deduplicates hostnames across buckets,
//! optionally re-verifies each one against trusted resolvers, and writes the
//! survivors to every configured sink.

mod emitter;
mod format;
mod sink;
mod verify;

// Re-export public API
pub use emitter::{EmitOptions, EmitReport, OutputEmitter};
pub use format::{format_hostname, OutputFormat};
pub use sink::{IgnoreBrokenPipe, OutputSinks};
pub use verify::{DnsTrustedVerifier, ResultHook, TrustedVerifier, VerifiedResponse};
