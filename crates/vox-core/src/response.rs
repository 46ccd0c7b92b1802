//! The per-invocation response object.
//!
//! A [`SkillResponse`] is created once per invocation and handed to every
//! middleware in the chain. Middleware compose the reply through the
//! chainable setters (`say`, `show`, `reprompt`, `link_account`) and finish
//! it with exactly one terminal operation (`send`, `end`, or `fail`). The
//! first terminal call latches the response: the completion signal fires
//! once, and every later mutation or terminal call is reported through the
//! diagnostic sink and otherwise ignored.
//!
//! The handle is cheap to clone (all state lives behind an `Arc`), so the
//! dispatch loop, middleware, and the caller can all hold it at once.
//!
//! # Example
//!
//! ```rust,ignore
//! response
//!     .say("Your horoscope for today is mysterious.")
//!     .show(("Horoscope", "Mysterious."))
//!     .reprompt("Anything else?");
//! response.send();
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use serde_json::{Map, Value};
use tokio::sync::oneshot;

use crate::diagnostics::SharedSink;
use crate::error::BoxError;
use crate::event::InvocationEvent;
use crate::output::{Card, OutputSpeech, Reprompt, ResponseBody, ResponseEnvelope, SpeechKind};

/// Receiver half of the one-shot completion signal.
///
/// Resolves to `Ok(())` when the response finished normally and
/// `Err(error)` when it failed. Fired at most once per invocation.
pub type CompletionReceiver = oneshot::Receiver<Result<(), BoxError>>;

type CompletionSender = oneshot::Sender<Result<(), BoxError>>;

/// The mutable half of the response, guarded by a mutex.
#[derive(Debug, Clone, Default)]
struct Draft {
    speech: Option<OutputSpeech>,
    reprompt: Option<OutputSpeech>,
    card: Option<Card>,
    should_end_session: bool,
}

struct ResponseInner {
    // Derived read-only view of the invocation event.
    version: String,
    is_new: bool,
    is_ending: bool,
    end_reason: Option<String>,
    session: Map<String, Value>,
    user: Value,
    application_id: Option<String>,
    handler_name: String,
    slots: HashMap<String, String>,

    // Latched true by the first terminal operation.
    sent: AtomicBool,
    draft: Mutex<Draft>,
    completion: Mutex<Option<CompletionSender>>,
    sink: SharedSink,
}

/// A cheap-clone handle to one invocation's response.
#[derive(Clone)]
pub struct SkillResponse {
    inner: Arc<ResponseInner>,
}

impl SkillResponse {
    /// Creates the response for one invocation event, along with the
    /// receiver the caller awaits for completion.
    pub fn new(event: InvocationEvent, sink: SharedSink) -> (Self, CompletionReceiver) {
        let handler_name = event.handler_name().to_string();
        let slots = event.flatten_slots();
        let is_ending = event.is_ending();
        let (tx, rx) = oneshot::channel();

        let inner = ResponseInner {
            version: event.version,
            is_new: event.session.is_new,
            is_ending,
            end_reason: event.request.reason,
            session: event.session.attributes,
            user: event.session.user,
            application_id: event.session.application.map(|app| app.application_id),
            handler_name,
            slots,
            sent: AtomicBool::new(false),
            draft: Mutex::new(Draft::default()),
            completion: Mutex::new(Some(tx)),
            sink,
        };

        (
            Self {
                inner: Arc::new(inner),
            },
            rx,
        )
    }

    // ========================================================================
    // Derived read-only fields
    // ========================================================================

    /// Protocol version of the invocation event.
    pub fn version(&self) -> &str {
        &self.inner.version
    }

    /// Whether this invocation opened a fresh session.
    pub fn is_new(&self) -> bool {
        self.inner.is_new
    }

    /// Whether this invocation ends the session.
    pub fn is_ending(&self) -> bool {
        self.inner.is_ending
    }

    /// Why the session ended, on session-ended invocations.
    pub fn end_reason(&self) -> Option<&str> {
        self.inner.end_reason.as_deref()
    }

    /// Session attributes persisted by the caller from the previous turn.
    pub fn session(&self) -> &Map<String, Value> {
        &self.inner.session
    }

    /// Opaque identity of the invoking user.
    pub fn user(&self) -> &Value {
        &self.inner.user
    }

    /// The application id the event was addressed to, if the platform
    /// supplied one.
    pub fn application_id(&self) -> Option<&str> {
        self.inner.application_id.as_deref()
    }

    /// The name routing matches against.
    pub fn handler_name(&self) -> &str {
        &self.inner.handler_name
    }

    /// Flattened slot values.
    pub fn slots(&self) -> &HashMap<String, String> {
        &self.inner.slots
    }

    /// Alias for [`slots`](Self::slots).
    pub fn params(&self) -> &HashMap<String, String> {
        self.slots()
    }

    /// Whether a terminal operation already ran.
    pub fn is_sent(&self) -> bool {
        self.inner.sent.load(Ordering::SeqCst)
    }

    /// The diagnostic sink this response reports warnings to.
    pub fn diagnostics(&self) -> &SharedSink {
        &self.inner.sink
    }

    // ========================================================================
    // Chainable setters
    // ========================================================================

    /// Sets plain-text output speech.
    pub fn say(&self, text: impl Into<String>) -> &Self {
        self.say_as(SpeechKind::PlainText, text)
    }

    /// Sets output speech of an explicit kind.
    pub fn say_as(&self, kind: SpeechKind, value: impl Into<String>) -> &Self {
        if self.open_for("say") {
            self.inner.draft.lock().speech = Some(OutputSpeech::new(kind, value));
        }
        self
    }

    /// Sets plain-text reprompt speech.
    pub fn reprompt(&self, text: impl Into<String>) -> &Self {
        self.reprompt_as(SpeechKind::PlainText, text)
    }

    /// Sets reprompt speech of an explicit kind.
    pub fn reprompt_as(&self, kind: SpeechKind, value: impl Into<String>) -> &Self {
        if self.open_for("reprompt") {
            self.inner.draft.lock().reprompt = Some(OutputSpeech::new(kind, value));
        }
        self
    }

    /// Sets the card: a `(title, content)` pair becomes a simple card, a
    /// [`StandardCard`](crate::output::StandardCard) becomes a standard one.
    pub fn show(&self, card: impl Into<Card>) -> &Self {
        if self.open_for("show") {
            self.inner.draft.lock().card = Some(card.into());
        }
        self
    }

    /// Sets the card to an account-linking prompt.
    pub fn link_account(&self) -> &Self {
        if self.open_for("link_account") {
            self.inner.draft.lock().card = Some(Card::LinkAccount);
        }
        self
    }

    // ========================================================================
    // Terminal operations
    // ========================================================================

    /// Finishes the response and closes the session.
    pub fn end(&self) {
        if self.is_sent() {
            self.warn_sent("end");
            return;
        }
        self.inner.draft.lock().should_end_session = true;
        self.settle(Ok(()), "end");
    }

    /// Alias for [`end`](Self::end).
    pub fn tell(&self) {
        self.end();
    }

    /// Finishes the response, leaving the session open.
    pub fn send(&self) {
        self.settle(Ok(()), "send");
    }

    /// Alias for [`send`](Self::send).
    pub fn ask(&self) {
        self.send();
    }

    /// Fails the invocation with the given error.
    pub fn fail(&self, error: impl Into<BoxError>) {
        self.settle(Err(error.into()), "fail");
    }

    // ========================================================================
    // Serialization
    // ========================================================================

    /// Produces the serialized response contract.
    pub fn to_envelope(&self) -> ResponseEnvelope {
        let draft = self.inner.draft.lock();
        ResponseEnvelope {
            version: self.inner.version.clone(),
            response: ResponseBody {
                output_speech: draft.speech.clone(),
                card: draft.card.clone(),
                reprompt: draft
                    .reprompt
                    .clone()
                    .map(|output_speech| Reprompt { output_speech }),
                should_end_session: draft.should_end_session,
            },
        }
    }

    /// Produces the response contract as a JSON value.
    pub fn to_json(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self.to_envelope())
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Returns true when the response may still be mutated; warns otherwise.
    fn open_for(&self, op: &str) -> bool {
        if self.is_sent() {
            self.warn_sent(op);
            return false;
        }
        true
    }

    /// Fires the completion signal exactly once. Later calls only warn.
    fn settle(&self, outcome: Result<(), BoxError>, op: &str) {
        if self.inner.sent.swap(true, Ordering::SeqCst) {
            self.warn_sent(op);
            return;
        }
        if let Some(tx) = self.inner.completion.lock().take() {
            // The receiver may already be gone if the caller dropped the
            // invocation without awaiting it.
            let _ = tx.send(outcome);
        }
    }

    fn warn_sent(&self, op: &str) {
        self.inner
            .sink
            .warn(&format!("Response already sent. Ignoring `{op}`."));
    }
}

impl std::fmt::Debug for SkillResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SkillResponse")
            .field("handler_name", &self.inner.handler_name)
            .field("is_new", &self.inner.is_new)
            .field("is_ending", &self.inner.is_ending)
            .field("sent", &self.is_sent())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticSink;
    use crate::output::StandardCard;
    use serde_json::json;

    #[derive(Default)]
    struct MemorySink(Mutex<Vec<String>>);

    impl DiagnosticSink for MemorySink {
        fn warn(&self, message: &str) {
            self.0.lock().push(message.to_string());
        }
    }

    fn intent_event() -> InvocationEvent {
        InvocationEvent::from_value(json!({
            "version": "1.0",
            "session": {
                "new": false,
                "application": { "applicationId": "amzn1.echo-sdk-ams.app.0000" },
                "attributes": { "supportedHoroscopePeriods": { "daily": true } },
                "user": { "userId": "amzn1.account.AM3B00000000000000000000000" }
            },
            "request": {
                "type": "IntentRequest",
                "intent": {
                    "name": "GetZodiacHoroscopeIntent",
                    "slots": { "ZodiacSign": { "name": "ZodiacSign", "value": "virgo" } }
                }
            }
        }))
        .unwrap()
    }

    fn response() -> (SkillResponse, CompletionReceiver) {
        SkillResponse::new(intent_event(), crate::diagnostics::default_sink())
    }

    fn response_with_sink() -> (SkillResponse, CompletionReceiver, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::default());
        let (res, rx) = SkillResponse::new(intent_event(), sink.clone());
        (res, rx, sink)
    }

    #[test]
    fn derived_fields_come_from_the_event() {
        let (res, _rx) = response();
        assert_eq!(res.version(), "1.0");
        assert!(!res.is_new());
        assert!(!res.is_ending());
        assert_eq!(res.end_reason(), None);
        assert_eq!(res.handler_name(), "GetZodiacHoroscopeIntent");
        assert_eq!(
            res.application_id(),
            Some("amzn1.echo-sdk-ams.app.0000")
        );
        assert_eq!(res.slots().get("ZodiacSign").map(String::as_str), Some("virgo"));
        assert_eq!(res.params(), res.slots());
        assert!(!res.is_sent());
    }

    #[test]
    fn setters_chain_on_the_same_handle() {
        let (res, _rx) = response();
        let chained = res
            .say("foo")
            .show(("foo", "bar"))
            .reprompt("baz")
            .link_account();
        assert!(std::ptr::eq(chained, &res));
    }

    #[test]
    fn say_defaults_to_plain_text() {
        let (res, _rx) = response();
        res.say("foo");
        assert_eq!(
            res.to_json().unwrap()["response"]["outputSpeech"],
            json!({ "type": "PlainText", "text": "foo" })
        );
    }

    #[test]
    fn say_as_supports_ssml() {
        let (res, _rx) = response();
        res.say_as(SpeechKind::Ssml, "<speak></speak>");
        assert_eq!(
            res.to_json().unwrap()["response"]["outputSpeech"],
            json!({ "type": "SSML", "ssml": "<speak></speak>" })
        );
    }

    #[test]
    fn reprompt_nests_under_output_speech() {
        let (res, _rx) = response();
        res.reprompt("foo");
        assert_eq!(
            res.to_json().unwrap()["response"]["reprompt"],
            json!({ "outputSpeech": { "type": "PlainText", "text": "foo" } })
        );
    }

    #[test]
    fn show_with_standard_card_keeps_only_set_fields() {
        let (res, _rx) = response();
        res.show(StandardCard {
            title: Some("test".to_string()),
            ..StandardCard::default()
        });
        assert_eq!(
            res.to_json().unwrap()["response"]["card"],
            json!({ "type": "Standard", "title": "test" })
        );
    }

    #[test]
    fn link_account_sets_the_card_type() {
        let (res, _rx) = response();
        res.link_account();
        assert_eq!(
            res.to_json().unwrap()["response"]["card"],
            json!({ "type": "LinkAccount" })
        );
    }

    #[test]
    fn end_latches_sent_and_closes_the_session() {
        let (res, mut rx) = response();
        res.end();
        assert!(res.is_sent());
        assert_eq!(
            res.to_json().unwrap()["response"]["shouldEndSession"],
            json!(true)
        );
        assert!(rx.try_recv().unwrap().is_ok());
    }

    #[test]
    fn send_leaves_the_session_open() {
        let (res, mut rx) = response();
        res.send();
        assert!(res.is_sent());
        assert_eq!(
            res.to_json().unwrap()["response"]["shouldEndSession"],
            json!(false)
        );
        assert!(rx.try_recv().unwrap().is_ok());
    }

    #[test]
    fn aliases_match_their_operations() {
        let (res, mut rx) = response();
        res.ask();
        assert!(res.is_sent());
        assert!(rx.try_recv().unwrap().is_ok());

        let (res, mut rx) = response();
        res.tell();
        assert!(res.is_sent());
        assert_eq!(
            res.to_json().unwrap()["response"]["shouldEndSession"],
            json!(true)
        );
        assert!(rx.try_recv().unwrap().is_ok());
    }

    #[test]
    fn fail_fires_the_failed_signal_with_the_error() {
        let (res, mut rx) = response();
        res.fail(crate::error::UnhandledEvent);
        assert!(res.is_sent());
        let err = rx.try_recv().unwrap().unwrap_err();
        assert_eq!(err.to_string(), "Unhandled event.");
    }

    #[test]
    fn second_terminal_call_warns_and_does_not_refire() {
        let (res, mut rx, sink) = response_with_sink();
        res.send();
        assert!(rx.try_recv().unwrap().is_ok());

        res.fail(crate::error::UnhandledEvent);
        res.end();
        // The channel fired once; later terminals only warn.
        assert!(rx.try_recv().is_err());
        let warnings = sink.0.lock();
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("`fail`"));
        assert!(warnings[1].contains("`end`"));
    }

    #[test]
    fn mutation_after_sent_is_ignored_and_warned() {
        let (res, _rx, sink) = response_with_sink();
        res.say("before");
        res.send();
        res.say("after").show(("x", "y")).reprompt("z");

        assert_eq!(
            res.to_json().unwrap()["response"]["outputSpeech"]["text"],
            json!("before")
        );
        assert!(res.to_json().unwrap()["response"].get("card").is_none());
        assert_eq!(sink.0.lock().len(), 3);
    }

    #[test]
    fn serializes_the_full_contract() {
        let (res, _rx) = response();
        res.say("foo")
            .show(("foo", "bar"))
            .reprompt_as(SpeechKind::Ssml, "<speak>foo</speak>");
        res.end();

        assert_eq!(
            res.to_json().unwrap(),
            json!({
                "version": "1.0",
                "response": {
                    "outputSpeech": { "type": "PlainText", "text": "foo" },
                    "card": { "type": "Simple", "title": "foo", "content": "bar" },
                    "reprompt": {
                        "outputSpeech": { "type": "SSML", "ssml": "<speak>foo</speak>" }
                    },
                    "shouldEndSession": true
                }
            })
        );
    }
}
