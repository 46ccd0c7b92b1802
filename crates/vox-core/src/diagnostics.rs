//! Diagnostic sink for non-fatal pipeline warnings.
//!
//! The pipeline deliberately tolerates a handful of misuses: sending a
//! response twice, mutating a response after it was sent, constructing a
//! skill without an application id. None of these abort the invocation;
//! they are reported through a [`DiagnosticSink`] instead, so embedders can
//! route them wherever they like. The default sink forwards to
//! [`tracing::warn!`].

use std::sync::Arc;

/// Receives non-fatal warnings emitted by the pipeline.
pub trait DiagnosticSink: Send + Sync {
    /// Reports a warning. Must not panic.
    fn warn(&self, message: &str);
}

/// A shared, type-erased diagnostic sink.
pub type SharedSink = Arc<dyn DiagnosticSink>;

/// The default sink: forwards every warning to `tracing` at WARN level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn warn(&self, message: &str) {
        tracing::warn!("{message}");
    }
}

/// Returns the sink used when the caller does not supply one.
pub fn default_sink() -> SharedSink {
    Arc::new(TracingSink)
}
