//! The skill pipeline.
//!
//! A [`Skill`] is the user-facing composition object: an ordered middleware
//! chain plus the machinery to run one invocation through it. Registration
//! happens up front (generic middleware via [`add`](Skill::add)/
//! [`with`](Skill::with), event-scoped handlers via [`on`](Skill::on));
//! then [`handle`](Skill::handle) is called once per incoming event.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut skill = Skill::with_options(SkillOptions {
//!     application_id: Some("amzn1.echo-sdk-ams.app.0000".into()),
//! });
//!
//! skill.on("GetZodiacHoroscopeIntent", |res: SkillResponse| async move {
//!     res.say("Today is a great day.");
//!     res.send();
//!     Ok(Flow::Halt)
//! });
//!
//! let invocation = skill.handle(event);
//! match invocation.outcome().await {
//!     Completion::Finished(response) => println!("{:?}", response.to_envelope()),
//!     Completion::Failed { error, .. } => eprintln!("failed: {error}"),
//! }
//! ```
//!
//! # Concurrency
//!
//! The chain is read-only during dispatch; finish registration before the
//! first `handle` call. Distinct invocations share nothing and may run
//! concurrently, but middleware within one invocation never overlap.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{Instrument, Level, debug, span};

use vox_core::{
    BoxError, CompletionReceiver, DiagnosticSink, InvocationEvent, SharedSink, SkillResponse,
    default_sink,
};

use crate::dispatch;
use crate::middleware::{BoxedMiddleware, Middleware};
use crate::routing::Route;
use crate::verify::verify_application;

/// Warning emitted when a skill is built without an application id.
const MISSING_APP_ID: &str =
    "No application id configured; events may come from unauthorized sources.";

/// Construction options for a [`Skill`].
///
/// Deserializable so embedders can load it from whatever configuration
/// layer they already use.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SkillOptions {
    /// When set, an application-verification middleware is installed ahead
    /// of everything else and events addressed to any other id fail.
    #[serde(default)]
    pub application_id: Option<String>,
}

/// Internal data for a skill.
///
/// Wrapped in an `Arc` so cloning a skill (and handing it to spawned
/// dispatch tasks) is cheap. `Clone` enables `Arc::make_mut` copy-on-write
/// for registration.
#[derive(Clone)]
struct SkillInner {
    stack: Vec<BoxedMiddleware>,
    sink: SharedSink,
}

/// An ordered middleware chain for one voice skill.
#[derive(Clone)]
pub struct Skill {
    inner: Arc<SkillInner>,
}

impl Default for Skill {
    fn default() -> Self {
        Self::new()
    }
}

impl Skill {
    /// Creates a skill with default options.
    ///
    /// Without an application id every event is accepted; a warning is
    /// reported through the diagnostic sink.
    pub fn new() -> Self {
        Self::with_options(SkillOptions::default())
    }

    /// Creates a skill from [`SkillOptions`].
    pub fn with_options(options: SkillOptions) -> Self {
        let sink = default_sink();
        let mut stack = Vec::new();

        match options.application_id {
            Some(id) => {
                debug!("installing application verification middleware");
                stack.push(verify_application(id));
            }
            None => sink.warn(MISSING_APP_ID),
        }

        Self {
            inner: Arc::new(SkillInner { stack, sink }),
        }
    }

    /// Internal helper to get mutable access to inner.
    /// Creates a new Arc if there are other references.
    fn inner_mut(&mut self) -> &mut SkillInner {
        Arc::make_mut(&mut self.inner)
    }

    /// Replaces the diagnostic sink warnings are reported through.
    pub fn diagnostics(mut self, sink: impl DiagnosticSink + 'static) -> Self {
        self.inner_mut().sink = Arc::new(sink);
        self
    }

    /// Appends a generic middleware to the chain.
    pub fn add<M>(&mut self, middleware: M)
    where
        M: Middleware + 'static,
    {
        self.add_boxed(Arc::new(middleware));
    }

    /// Appends an already-boxed middleware to the chain.
    pub fn add_boxed(&mut self, middleware: BoxedMiddleware) {
        debug!(position = self.inner.stack.len(), "adding middleware");
        self.inner_mut().stack.push(middleware);
    }

    /// Appends a middleware (builder pattern).
    pub fn with<M>(mut self, middleware: M) -> Self
    where
        M: Middleware + 'static,
    {
        self.add(middleware);
        self
    }

    /// Appends a handler gated on one handler name.
    ///
    /// Several handlers may be registered for the same name; they run in
    /// registration order, each free to continue or terminate the response.
    pub fn on<M>(&mut self, event: impl Into<String>, handler: M)
    where
        M: Middleware + 'static,
    {
        self.add_boxed(crate::routing::on(event, handler));
    }

    /// Appends a sequence of handlers gated on one handler name, in order.
    pub fn on_all(
        &mut self,
        event: impl Into<String>,
        handlers: impl IntoIterator<Item = BoxedMiddleware>,
    ) {
        let event = event.into();
        for handler in handlers {
            self.add_boxed(Arc::new(Route::wrap(event.clone(), handler)));
        }
    }

    /// Returns the number of registered middleware.
    pub fn middleware_count(&self) -> usize {
        self.inner.stack.len()
    }

    /// Runs one invocation through the chain.
    ///
    /// Dispatch runs on a spawned task, so the completion signal is never
    /// delivered inside this call; the returned [`Invocation`] can always
    /// be inspected, or awaited, after `handle` returns.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime; running inside one is
    /// part of the calling contract.
    pub fn handle(&self, event: InvocationEvent) -> Invocation {
        let (response, completion) = SkillResponse::new(event, Arc::clone(&self.inner.sink));
        let span = span!(Level::DEBUG, "dispatch", handler = %response.handler_name());

        let inner = Arc::clone(&self.inner);
        let task_response = response.clone();
        tokio::spawn(
            async move { dispatch::run(task_response, &inner.stack).await }.instrument(span),
        );

        Invocation {
            response,
            completion,
        }
    }
}

impl std::fmt::Debug for Skill {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Skill")
            .field("middleware_count", &self.inner.stack.len())
            .finish()
    }
}

// ============================================================================
// Invocation
// ============================================================================

/// One in-flight invocation.
///
/// The response handle is available immediately; the terminal outcome
/// arrives by awaiting [`outcome`](Invocation::outcome).
#[derive(Debug)]
pub struct Invocation {
    response: SkillResponse,
    completion: CompletionReceiver,
}

impl Invocation {
    /// The live response handle, inspectable before completion.
    pub fn response(&self) -> &SkillResponse {
        &self.response
    }

    /// Waits for the terminal outcome of this invocation.
    ///
    /// Resolves when a middleware sends, ends, or fails the response, or
    /// when the chain is exhausted. A chain that halts without a terminal
    /// call never resolves.
    pub async fn outcome(self) -> Completion {
        let Self {
            response,
            completion,
        } = self;
        match completion.await {
            Ok(Ok(())) => Completion::Finished(response),
            Ok(Err(error)) => Completion::Failed { error, response },
            // The sender lives inside the response held right here, so the
            // channel only closes without a value if the signal was already
            // consumed; the sent latch prevents a second send.
            Err(closed) => Completion::Failed {
                error: Box::new(closed),
                response,
            },
        }
    }
}

/// The terminal outcome of an invocation.
#[derive(Debug)]
pub enum Completion {
    /// A middleware sent the response.
    Finished(SkillResponse),
    /// The invocation failed. The response is still available so callers
    /// can inspect what was composed before the failure.
    Failed {
        /// The error the invocation failed with.
        error: BoxError,
        /// The response at the time of failure.
        response: SkillResponse,
    },
}

impl Completion {
    /// The response, regardless of outcome.
    pub fn response(&self) -> &SkillResponse {
        match self {
            Completion::Finished(response) => response,
            Completion::Failed { response, .. } => response,
        }
    }

    /// The failure, if the invocation failed.
    pub fn error(&self) -> Option<&(dyn std::error::Error + Send + Sync)> {
        match self {
            Completion::Finished(_) => None,
            Completion::Failed { error, .. } => Some(error.as_ref()),
        }
    }

    /// Whether the invocation finished normally.
    pub fn is_finished(&self) -> bool {
        matches!(self, Completion::Finished(_))
    }
}
