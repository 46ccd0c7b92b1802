//! The dispatch loop.
//!
//! [`run`] drives one invocation through an ordered middleware chain. It is
//! a plain index-driven loop rather than a chain of nested continuations, so
//! arbitrarily long chains never grow the call stack.
//!
//! The loop is a small state machine:
//!
//! ```text
//!            Ok(Continue)                    Ok(Halt) / terminal
//! Running(i) ────────────▶ Running(i + 1)   ────────────────────▶ Sent
//!      │
//!      │ Err(e) / exhaustion
//!      ▼
//!    Failed
//! ```
//!
//! Sent and Failed are terminal: once the response is latched, no further
//! middleware runs and any attempt to continue the chain only produces a
//! diagnostic warning.

use tracing::{debug, trace};

use vox_core::{SkillResponse, UnhandledEvent};

use crate::middleware::{BoxedMiddleware, Flow};

/// Warning emitted when control is handed onward after a terminal call.
const CONTINUED_AFTER_SENT: &str =
    "Response already sent. Don't continue the middleware chain after sending.";

/// Runs `stack` against `response`, strictly in order.
///
/// The loop guarantees:
/// - middleware run one at a time, in registration order, never after the
///   response is sent;
/// - an `Err` return skips every remaining middleware and fails the
///   response with that error;
/// - exhausting the chain without a terminal call fails the response with
///   [`UnhandledEvent`];
/// - a middleware that halts without sending stops the chain and leaves the
///   invocation unresolved; there is no timeout.
pub async fn run(response: SkillResponse, stack: &[BoxedMiddleware]) {
    for (index, middleware) in stack.iter().enumerate() {
        if response.is_sent() {
            response.diagnostics().warn(CONTINUED_AFTER_SENT);
            return;
        }

        trace!(index, "running middleware");
        match middleware.call(response.clone()).await {
            Ok(Flow::Continue) => {}
            Ok(Flow::Halt) => {
                debug!(index, "middleware halted the chain");
                return;
            }
            Err(error) => {
                debug!(index, %error, "middleware failed, short-circuiting");
                // fail() itself warns when the response was already sent.
                response.fail(error);
                return;
            }
        }
    }

    if response.is_sent() {
        response.diagnostics().warn(CONTINUED_AFTER_SENT);
        return;
    }
    debug!("middleware chain exhausted without a response");
    response.fail(UnhandledEvent);
}
