//! # Vox
//!
//! A middleware pipeline for voice-assistant skills.
//!
//! ## Overview
//!
//! Vox accepts one structured invocation event, routes it through an ordered
//! chain of middleware, lets exactly one of them produce a response, and
//! guarantees the response is emitted exactly once, however many middleware
//! ran and whether they succeeded or failed.
//!
//! ```text
//! ┌───────────────┐     ┌───────┐     ┌──────────────────────────┐
//! │ Invocation    │────▶│ Skill │────▶│ middleware (in order)    │
//! │ Event (JSON)  │     │       │────▶│ routed handlers          │
//! └───────────────┘     └───────┘────▶│ ...                      │
//!                                     └──────────────────────────┘
//!                                            │ first terminal call
//!                                            ▼
//!                                     ResponseEnvelope (JSON)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use vox::prelude::*;
//!
//! async fn horoscope(res: SkillResponse) -> Result<Flow, BoxError> {
//!     let sign = res.slots().get("ZodiacSign").cloned().unwrap_or_default();
//!     res.say(format!("The stars look good for {sign}."));
//!     res.send();
//!     Ok(Flow::Halt)
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), BoxError> {
//!     let mut skill = Skill::new();
//!     skill.on("GetZodiacHoroscopeIntent", horoscope);
//!
//!     let event = InvocationEvent::from_json(raw_event)?;
//!     match skill.handle(event).outcome().await {
//!         Completion::Finished(response) => println!("{:?}", response.to_envelope()),
//!         Completion::Failed { error, .. } => eprintln!("failed: {error}"),
//!     }
//!     Ok(())
//! }
//! ```

pub use vox_core as core;
pub use vox_framework as framework;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use vox::prelude::*;
/// ```
pub mod prelude {
    // Event model and response object
    pub use vox_core::{
        InvocationEvent, SkillResponse, INTENT_REQUEST, LAUNCH_REQUEST, SESSION_ENDED_REQUEST,
    };

    // Response content types
    pub use vox_core::{Card, Image, SpeechKind, StandardCard};

    // Errors and diagnostics
    pub use vox_core::{BoxError, DiagnosticSink, UnhandledEvent};

    // Pipeline composition
    pub use vox_framework::{
        BoxedMiddleware, Completion, Flow, Invocation, Middleware, Skill, SkillOptions, on,
    };
}
