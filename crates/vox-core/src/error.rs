//! Error types shared across the Vox pipeline.
//!
//! Dispatch failures travel as boxed errors so middleware can surface any
//! error type they like; the named types below cover the failures the
//! pipeline itself produces.

use thiserror::Error;

/// A type-erased error produced by middleware or the pipeline itself.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Raised when the middleware chain runs out without any middleware
/// producing a response.
///
/// The display string is part of the public contract: callers match on it
/// to distinguish "nobody claimed this event" from genuine handler errors.
#[derive(Debug, Clone, Error)]
#[error("Unhandled event.")]
pub struct UnhandledEvent;
