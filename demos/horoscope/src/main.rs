//! Horoscope Skill Demo
//!
//! A small end-to-end run of the Vox pipeline: a skill with a logging
//! middleware and three routed handlers processes a canned intent event and
//! prints the serialized response envelope.
//!
//! # Usage
//!
//! ```bash
//! cargo run --package horoscope
//! RUST_LOG=debug cargo run --package horoscope
//! ```

use tracing::info;
use tracing_subscriber::EnvFilter;

use vox::prelude::*;

/// The skill id the canned event is addressed to.
const APPLICATION_ID: &str = "amzn1.echo-sdk-ams.app.horoscope-demo";

/// A canned intent event, shaped the way the platform posts them.
const INTENT_EVENT: &str = r#"{
    "version": "1.0",
    "session": {
        "new": false,
        "sessionId": "session1234",
        "application": { "applicationId": "amzn1.echo-sdk-ams.app.horoscope-demo" },
        "attributes": {},
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
}"#;

// ============================================================================
// Middleware
// ============================================================================

/// Logs every invocation, then passes control onward.
async fn log_invocation(res: SkillResponse) -> Result<Flow, BoxError> {
    info!(
        handler = res.handler_name(),
        new_session = res.is_new(),
        "invocation received"
    );
    Ok(Flow::Continue)
}

/// Greets the user when the skill is opened without an intent.
async fn welcome(res: SkillResponse) -> Result<Flow, BoxError> {
    res.say("Welcome to the horoscope. Which sign should I read?")
        .reprompt("Which zodiac sign would you like a horoscope for?");
    res.ask();
    Ok(Flow::Halt)
}

/// Answers the horoscope question.
async fn horoscope(res: SkillResponse) -> Result<Flow, BoxError> {
    let sign = res
        .slots()
        .get("ZodiacSign")
        .cloned()
        .unwrap_or_else(|| "your sign".to_string());

    res.say(format!(
        "The stars look promising for {sign} today. Expect a pleasant surprise."
    ))
    .show((
        "Horoscope",
        "The stars look promising today. Expect a pleasant surprise.",
    ));
    res.tell();
    Ok(Flow::Halt)
}

/// Acknowledges the end of a session.
async fn goodbye(res: SkillResponse) -> Result<Flow, BoxError> {
    info!(reason = res.end_reason().unwrap_or("unknown"), "session ended");
    res.end();
    Ok(Flow::Halt)
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut skill = Skill::with_options(SkillOptions {
        application_id: Some(APPLICATION_ID.to_string()),
    });
    skill.add(log_invocation);
    skill.on(LAUNCH_REQUEST, welcome);
    skill.on("GetZodiacHoroscopeIntent", horoscope);
    skill.on(SESSION_ENDED_REQUEST, goodbye);

    let event = InvocationEvent::from_json(INTENT_EVENT)?;
    match skill.handle(event).outcome().await {
        Completion::Finished(response) => {
            let envelope = response.to_json()?;
            println!("{}", serde_json::to_string_pretty(&envelope)?);
        }
        Completion::Failed { error, .. } => {
            tracing::error!(%error, "invocation failed");
        }
    }

    Ok(())
}
