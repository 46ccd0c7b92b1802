//! Invocation events.
//!
//! An [`InvocationEvent`] is the read-only input to one pipeline run: the
//! JSON document a voice platform posts when a user opens a skill, speaks an
//! intent, or abandons the session. The event is deserialized once and never
//! mutated; everything the pipeline derives from it (handler name, flattened
//! slots, session-ending state) is computed up front.
//!
//! # Handler names
//!
//! Routing works on a single string, the *handler name*: the intent name
//! when the request carries an intent, the raw request type otherwise. A
//! launch therefore routes as `"LaunchRequest"` while a horoscope question
//! routes as `"GetZodiacHoroscopeIntent"`.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::{Map, Value};

// ============================================================================
// Request type constants
// ============================================================================

/// Request type sent when the user opens the skill without an intent.
pub const LAUNCH_REQUEST: &str = "LaunchRequest";

/// Request type carrying an intent payload.
pub const INTENT_REQUEST: &str = "IntentRequest";

/// Request type sent when the session ends for any reason.
pub const SESSION_ENDED_REQUEST: &str = "SessionEndedRequest";

// ============================================================================
// Event model
// ============================================================================

/// One skill invocation, as posted by the platform.
///
/// Unknown fields (request ids, timestamps, locale data) are ignored so the
/// model stays compatible with platform additions.
#[derive(Debug, Clone, Deserialize)]
pub struct InvocationEvent {
    /// Protocol version, echoed back in the response envelope.
    pub version: String,
    /// Session descriptor.
    pub session: Session,
    /// Request descriptor.
    pub request: RequestBody,
}

/// The session half of an invocation.
#[derive(Debug, Clone, Deserialize)]
pub struct Session {
    /// Whether this invocation opened a fresh session.
    #[serde(rename = "new")]
    pub is_new: bool,
    /// Attributes the caller persisted from the previous turn.
    #[serde(default)]
    pub attributes: Map<String, Value>,
    /// The skill the platform believes it is invoking.
    #[serde(default)]
    pub application: Option<Application>,
    /// Opaque identity of the invoking user.
    #[serde(default)]
    pub user: Value,
}

/// Identifies the skill an event was addressed to.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    /// The platform-assigned skill id.
    pub application_id: String,
}

/// The request half of an invocation.
#[derive(Debug, Clone, Deserialize)]
pub struct RequestBody {
    /// Raw request type, e.g. `"IntentRequest"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Intent payload, present on intent-style requests.
    #[serde(default)]
    pub intent: Option<Intent>,
    /// Why the session ended, on session-ended requests.
    #[serde(default)]
    pub reason: Option<String>,
}

/// An intent and its slot values.
#[derive(Debug, Clone, Deserialize)]
pub struct Intent {
    /// The intent name, used as the handler name for routing.
    pub name: String,
    /// Slot values keyed by slot name.
    #[serde(default)]
    pub slots: HashMap<String, Slot>,
}

/// A single slot. The platform repeats the name inside the value object;
/// only the value matters here.
#[derive(Debug, Clone, Deserialize)]
pub struct Slot {
    /// The recognized value, absent when the user did not fill the slot.
    #[serde(default)]
    pub value: Option<String>,
}

impl InvocationEvent {
    /// Deserializes an event from its JSON wire form.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Deserializes an event from an already-parsed JSON value.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// The name middleware routing matches against: the intent name when an
    /// intent is present, the request type otherwise.
    pub fn handler_name(&self) -> &str {
        match &self.request.intent {
            Some(intent) => &intent.name,
            None => &self.request.kind,
        }
    }

    /// Whether this invocation ends the session.
    pub fn is_ending(&self) -> bool {
        self.request.kind == SESSION_ENDED_REQUEST
    }

    /// Collapses `{name: {value}}` slot pairs into a flat `{name: value}`
    /// map. Slots the user left unfilled are dropped.
    pub fn flatten_slots(&self) -> HashMap<String, String> {
        let Some(intent) = &self.request.intent else {
            return HashMap::new();
        };
        intent
            .slots
            .iter()
            .filter_map(|(name, slot)| Some((name.clone(), slot.value.clone()?)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn intent_event() -> InvocationEvent {
        InvocationEvent::from_value(json!({
            "version": "1.0",
            "session": {
                "new": false,
                "sessionId": "session1234",
                "application": { "applicationId": "amzn1.echo-sdk-ams.app.0000" },
                "attributes": { "supportedHoroscopePeriods": { "daily": true } },
                "user": { "userId": "amzn1.account.AM3B00000000000000000000000" }
            },
            "request": {
                "type": "IntentRequest",
                "requestId": "request5678",
                "timestamp": "2015-05-13T12:34:56Z",
                "intent": {
                    "name": "GetZodiacHoroscopeIntent",
                    "slots": {
                        "ZodiacSign": { "name": "ZodiacSign", "value": "virgo" }
                    }
                }
            }
        }))
        .unwrap()
    }

    fn session_ended_event() -> InvocationEvent {
        InvocationEvent::from_value(json!({
            "version": "1.0",
            "session": { "new": false, "user": {} },
            "request": { "type": "SessionEndedRequest", "reason": "USER_INITIATED" }
        }))
        .unwrap()
    }

    #[test]
    fn intent_name_wins_as_handler_name() {
        assert_eq!(intent_event().handler_name(), "GetZodiacHoroscopeIntent");
    }

    #[test]
    fn request_type_is_the_handler_name_without_an_intent() {
        assert_eq!(session_ended_event().handler_name(), SESSION_ENDED_REQUEST);
    }

    #[test]
    fn slots_flatten_to_name_value_pairs() {
        let slots = intent_event().flatten_slots();
        assert_eq!(slots.len(), 1);
        assert_eq!(slots.get("ZodiacSign").map(String::as_str), Some("virgo"));
    }

    #[test]
    fn unfilled_slots_are_dropped() {
        let event = InvocationEvent::from_value(json!({
            "version": "1.0",
            "session": { "new": true, "user": {} },
            "request": {
                "type": "IntentRequest",
                "intent": {
                    "name": "GetZodiacHoroscopeIntent",
                    "slots": { "ZodiacSign": { "name": "ZodiacSign" } }
                }
            }
        }))
        .unwrap();
        assert!(event.flatten_slots().is_empty());
    }

    #[test]
    fn session_ended_request_is_ending() {
        let event = session_ended_event();
        assert!(event.is_ending());
        assert_eq!(event.request.reason.as_deref(), Some("USER_INITIATED"));
        assert!(!intent_event().is_ending());
    }

    #[test]
    fn missing_optional_sections_default() {
        let event = InvocationEvent::from_value(json!({
            "version": "1.0",
            "session": { "new": true },
            "request": { "type": "LaunchRequest" }
        }))
        .unwrap();
        assert!(event.session.attributes.is_empty());
        assert!(event.session.application.is_none());
        assert!(event.session.user.is_null());
        assert_eq!(event.handler_name(), LAUNCH_REQUEST);
    }

    #[test]
    fn malformed_events_fail_loudly() {
        assert!(InvocationEvent::from_json("{\"version\": \"1.0\"}").is_err());
    }
}
