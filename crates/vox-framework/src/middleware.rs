//! The middleware contract.
//!
//! A middleware receives the invocation's [`SkillResponse`] and decides what
//! happens next by what it returns:
//!
//! - `Ok(Flow::Continue)`: hand control to the next middleware in the chain
//! - `Ok(Flow::Halt)`: stop the chain, typically after a terminal call on
//!   the response
//! - `Err(error)`: short-circuit the chain and fail the invocation
//!
//! The trait is implemented for any `async fn(SkillResponse) -> Result<Flow,
//! BoxError>` (including closures), so most middleware are plain functions:
//!
//! ```rust,ignore
//! async fn horoscope(res: SkillResponse) -> Result<Flow, BoxError> {
//!     res.say("Today is a great day.");
//!     res.send();
//!     Ok(Flow::Halt)
//! }
//!
//! skill.add(horoscope);
//! ```

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use vox_core::{BoxError, SkillResponse};

/// What the dispatch loop does after a middleware returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Pass control to the next middleware in the chain.
    Continue,
    /// Stop the chain. Nothing further runs for this invocation.
    Halt,
}

/// One step of the invocation pipeline.
///
/// Middleware may await freely (network lookups, timers) before deciding
/// how to proceed; the chain stays strictly sequential either way.
#[async_trait]
pub trait Middleware: Send + Sync {
    /// Runs this middleware against the invocation's response.
    async fn call(&self, response: SkillResponse) -> Result<Flow, BoxError>;
}

/// A type-erased middleware that can be stored in the chain.
pub type BoxedMiddleware = Arc<dyn Middleware>;

#[async_trait]
impl<F, Fut> Middleware for F
where
    F: Fn(SkillResponse) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Flow, BoxError>> + Send + 'static,
{
    async fn call(&self, response: SkillResponse) -> Result<Flow, BoxError> {
        (self)(response).await
    }
}

/// Boxes a middleware for storage in the chain.
pub fn into_middleware<M>(middleware: M) -> BoxedMiddleware
where
    M: Middleware + 'static,
{
    Arc::new(middleware)
}
