//! # Vox Framework
//!
//! Middleware dispatch and routing for the Vox skill pipeline.
//!
//! This layer turns the foundation types from `vox-core` into a working
//! pipeline:
//!
//! - [`Middleware`]: the contract one step of the chain implements
//! - [`Route`] / [`on`]: gate a middleware on one handler name
//! - [`dispatch`]: the ordered, short-circuiting dispatch loop
//! - [`Skill`]: registration plus per-event invocation
//! - [`VerifyApplication`]: reject events addressed to another skill
//!
//! ## Control flow
//!
//! ```text
//! ┌───────┐  handle   ┌───────────────┐   in order   ┌────────────┐
//! │ Skill │──────────▶│ dispatch loop │─────────────▶│ middleware │
//! └───────┘           └───────────────┘              └────────────┘
//!      │                      │ first terminal call latches the response
//!      ▼                      ▼
//! Invocation ◀──────── completion signal (finished / failed)
//! ```

pub mod dispatch;
pub mod middleware;
pub mod routing;
pub mod skill;
pub mod verify;

pub use middleware::{BoxedMiddleware, Flow, Middleware, into_middleware};
pub use routing::{Route, on};
pub use skill::{Completion, Invocation, Skill, SkillOptions};
pub use verify::{VerifyApplication, VerifyError, verify_application};
