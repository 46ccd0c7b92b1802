//! Event-scoped routing.
//!
//! A [`Route`] wraps a middleware so it only runs for one handler name:
//! the intent name, or the raw request type for intent-less requests. For
//! every other invocation it yields [`Flow::Continue`] untouched, so routed
//! and generic middleware mix freely in one chain.
//!
//! Matching is a case-sensitive string comparison; several routes may share
//! the same handler name and run in registration order.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::trace;

use vox_core::{BoxError, SkillResponse};

use crate::middleware::{BoxedMiddleware, Flow, Middleware};

/// A middleware gated on the invocation's handler name.
pub struct Route {
    event: String,
    inner: BoxedMiddleware,
}

impl Route {
    /// Gates `handler` on `event`.
    pub fn new(event: impl Into<String>, handler: impl Middleware + 'static) -> Self {
        Self::wrap(event.into(), Arc::new(handler))
    }

    /// Gates an already-boxed middleware on `event`.
    pub fn wrap(event: String, handler: BoxedMiddleware) -> Self {
        Self {
            event,
            inner: handler,
        }
    }

    /// The handler name this route matches.
    pub fn event(&self) -> &str {
        &self.event
    }
}

#[async_trait]
impl Middleware for Route {
    async fn call(&self, response: SkillResponse) -> Result<Flow, BoxError> {
        if response.handler_name() == self.event {
            trace!(event = %self.event, "route matched, running handler");
            self.inner.call(response).await
        } else {
            trace!(
                event = %self.event,
                got = %response.handler_name(),
                "route did not match, passing through"
            );
            Ok(Flow::Continue)
        }
    }
}

/// Convenience constructor: a boxed, event-gated middleware.
pub fn on<M>(event: impl Into<String>, handler: M) -> BoxedMiddleware
where
    M: Middleware + 'static,
{
    Arc::new(Route::new(event, handler))
}
