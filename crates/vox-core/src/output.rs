//! The serialized response contract.
//!
//! This module defines the wire shape a finished invocation serializes to:
//!
//! ```text
//! { "version": "1.0",
//!   "response": {
//!     "outputSpeech": { "type": "PlainText", "text": "..." },
//!     "card": { "type": "Simple", "title": "...", "content": "..." },
//!     "reprompt": { "outputSpeech": { "type": "SSML", "ssml": "..." } },
//!     "shouldEndSession": true } }
//! ```
//!
//! Fields the skill never set are omitted entirely, not serialized as null.

use serde::Serialize;

// ============================================================================
// Speech
// ============================================================================

/// The two speech renditions a voice platform accepts.
///
/// Using an enum rather than a free-form string means an invalid kind is a
/// compile error, not a runtime assertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpeechKind {
    /// Plain text, spoken verbatim.
    PlainText,
    /// Speech Synthesis Markup Language.
    Ssml,
}

/// Speech content, tagged the way the platform expects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum OutputSpeech {
    /// `{ "type": "PlainText", "text": ... }`
    PlainText {
        /// The text to speak.
        text: String,
    },
    /// `{ "type": "SSML", "ssml": ... }`
    #[serde(rename = "SSML")]
    Ssml {
        /// The SSML document to render.
        ssml: String,
    },
}

impl OutputSpeech {
    /// Builds speech of the given kind.
    pub fn new(kind: SpeechKind, value: impl Into<String>) -> Self {
        match kind {
            SpeechKind::PlainText => Self::PlainText { text: value.into() },
            SpeechKind::Ssml => Self::Ssml { ssml: value.into() },
        }
    }
}

// ============================================================================
// Cards
// ============================================================================

/// Images attached to a standard card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    /// URL of the small rendition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub small_image_url: Option<String>,
    /// URL of the large rendition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub large_image_url: Option<String>,
}

/// The fields of a standard (rich) card. Converts into [`Card::Standard`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StandardCard {
    /// Card title.
    pub title: Option<String>,
    /// Card body text.
    pub content: Option<String>,
    /// Optional image.
    pub image: Option<Image>,
}

/// A companion-app card, tagged the way the platform expects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum Card {
    /// A title/content text card.
    Simple {
        /// Card title.
        title: String,
        /// Card body text.
        content: String,
    },
    /// A rich card where every field is optional.
    Standard {
        /// Card title.
        #[serde(skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        /// Card body text.
        #[serde(skip_serializing_if = "Option::is_none")]
        content: Option<String>,
        /// Optional image.
        #[serde(skip_serializing_if = "Option::is_none")]
        image: Option<Image>,
    },
    /// Prompts the user to link their account.
    LinkAccount,
}

impl From<StandardCard> for Card {
    fn from(card: StandardCard) -> Self {
        Card::Standard {
            title: card.title,
            content: card.content,
            image: card.image,
        }
    }
}

impl From<(&str, &str)> for Card {
    fn from((title, content): (&str, &str)) -> Self {
        Card::Simple {
            title: title.to_string(),
            content: content.to_string(),
        }
    }
}

impl From<(String, String)> for Card {
    fn from((title, content): (String, String)) -> Self {
        Card::Simple { title, content }
    }
}

// ============================================================================
// Envelope
// ============================================================================

/// The reprompt wrapper: speech nested under an `outputSpeech` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reprompt {
    /// The speech to play when the user stays silent.
    pub output_speech: OutputSpeech,
}

/// The `response` object of the envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseBody {
    /// Speech played immediately.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_speech: Option<OutputSpeech>,
    /// Card shown in the companion app.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card: Option<Card>,
    /// Speech played if the user stays silent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reprompt: Option<Reprompt>,
    /// Whether the session closes after this response.
    pub should_end_session: bool,
}

/// The complete serialized response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    /// Protocol version, echoed from the invocation event.
    pub version: String,
    /// The response payload.
    pub response: ResponseBody,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plain_speech_serializes_with_text_key() {
        let speech = OutputSpeech::new(SpeechKind::PlainText, "foo");
        assert_eq!(
            serde_json::to_value(&speech).unwrap(),
            json!({ "type": "PlainText", "text": "foo" })
        );
    }

    #[test]
    fn ssml_speech_serializes_with_ssml_key() {
        let speech = OutputSpeech::new(SpeechKind::Ssml, "<speak></speak>");
        assert_eq!(
            serde_json::to_value(&speech).unwrap(),
            json!({ "type": "SSML", "ssml": "<speak></speak>" })
        );
    }

    #[test]
    fn simple_card_from_title_and_content() {
        let card: Card = ("foo", "bar").into();
        assert_eq!(
            serde_json::to_value(&card).unwrap(),
            json!({ "type": "Simple", "title": "foo", "content": "bar" })
        );
    }

    #[test]
    fn standard_card_omits_unset_fields() {
        let card: Card = StandardCard {
            title: Some("test".to_string()),
            ..StandardCard::default()
        }
        .into();
        assert_eq!(
            serde_json::to_value(&card).unwrap(),
            json!({ "type": "Standard", "title": "test" })
        );
    }

    #[test]
    fn link_account_card_is_tag_only() {
        assert_eq!(
            serde_json::to_value(Card::LinkAccount).unwrap(),
            json!({ "type": "LinkAccount" })
        );
    }

    #[test]
    fn empty_body_serializes_to_session_flag_only() {
        let body = ResponseBody::default();
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({ "shouldEndSession": false })
        );
    }
}
