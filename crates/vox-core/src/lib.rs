//! # Vox Core
//!
//! Foundation types for the Vox skill pipeline.
//!
//! This crate holds everything one invocation is made of, with no opinion on
//! how middleware are organized (that lives in `vox-framework`):
//!
//! - **Event model**: the read-only [`InvocationEvent`] a voice platform
//!   posts, plus the handler-name and slot derivations routing relies on
//! - **Response object**: [`SkillResponse`], the mutable object middleware
//!   compose a reply into, with its one-shot terminal latch
//! - **Wire contract**: the serialized [`ResponseEnvelope`] shape
//! - **Diagnostics**: the pluggable [`DiagnosticSink`] non-fatal warnings
//!   flow through
//!
//! ## Lifecycle
//!
//! ```text
//! ┌────────────────┐     ┌───────────────┐     ┌──────────────────┐
//! │ InvocationEvent│────▶│ SkillResponse │────▶│ ResponseEnvelope │
//! │   (read-only)  │     │   (mutable)   │     │   (serialized)   │
//! └────────────────┘     └───────────────┘     └──────────────────┘
//! ```
//!
//! A response is created from one event, mutated by middleware until the
//! first terminal operation latches it, and serialized exactly once.

pub mod diagnostics;
pub mod error;
pub mod event;
pub mod output;
pub mod response;

pub use diagnostics::{DiagnosticSink, SharedSink, TracingSink, default_sink};
pub use error::{BoxError, UnhandledEvent};
pub use event::{
    Application, Intent, InvocationEvent, RequestBody, Session, Slot, INTENT_REQUEST,
    LAUNCH_REQUEST, SESSION_ENDED_REQUEST,
};
pub use output::{
    Card, Image, OutputSpeech, Reprompt, ResponseBody, ResponseEnvelope, SpeechKind, StandardCard,
};
pub use response::{CompletionReceiver, SkillResponse};
