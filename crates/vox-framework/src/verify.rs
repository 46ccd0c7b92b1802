//! Application verification.
//!
//! Voice platforms address every event to a specific skill id. When a skill
//! is configured with its id, [`verify_application`] runs ahead of all other
//! middleware and rejects events addressed elsewhere, so handlers never see
//! traffic meant for another skill.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use vox_core::{BoxError, SkillResponse};

use crate::middleware::{BoxedMiddleware, Flow, Middleware};

/// Why an event failed application verification.
#[derive(Debug, Clone, Error)]
pub enum VerifyError {
    /// The event carried no application id at all.
    #[error("event carries no application id")]
    MissingApplicationId,

    /// The event was addressed to a different skill.
    #[error("unauthorized application id '{0}'")]
    UnauthorizedApplication(String),
}

/// Middleware that rejects events addressed to another skill.
pub struct VerifyApplication {
    expected: String,
}

impl VerifyApplication {
    /// Accepts only events addressed to `expected`.
    pub fn new(expected: impl Into<String>) -> Self {
        Self {
            expected: expected.into(),
        }
    }
}

#[async_trait]
impl Middleware for VerifyApplication {
    async fn call(&self, response: SkillResponse) -> Result<Flow, BoxError> {
        match response.application_id() {
            Some(id) if id == self.expected => Ok(Flow::Continue),
            Some(id) => Err(VerifyError::UnauthorizedApplication(id.to_string()).into()),
            None => Err(VerifyError::MissingApplicationId.into()),
        }
    }
}

/// Boxed convenience constructor for [`VerifyApplication`].
pub fn verify_application(expected: impl Into<String>) -> BoxedMiddleware {
    Arc::new(VerifyApplication::new(expected))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use vox_core::{InvocationEvent, default_sink};

    fn response_with_app(application: Value) -> SkillResponse {
        let mut session = json!({ "new": true, "user": {} });
        if !application.is_null() {
            session["application"] = application;
        }
        let event = InvocationEvent::from_value(json!({
            "version": "1.0",
            "session": session,
            "request": { "type": "LaunchRequest" }
        }))
        .unwrap();
        SkillResponse::new(event, default_sink()).0
    }

    #[tokio::test]
    async fn accepts_the_configured_id() {
        let verify = VerifyApplication::new("app-1");
        let res = response_with_app(json!({ "applicationId": "app-1" }));
        assert_eq!(verify.call(res).await.unwrap(), Flow::Continue);
    }

    #[tokio::test]
    async fn rejects_a_foreign_id() {
        let verify = VerifyApplication::new("app-1");
        let res = response_with_app(json!({ "applicationId": "app-2" }));
        let err = verify.call(res).await.unwrap_err();
        assert_eq!(err.to_string(), "unauthorized application id 'app-2'");
    }

    #[tokio::test]
    async fn rejects_a_missing_id() {
        let verify = VerifyApplication::new("app-1");
        let res = response_with_app(Value::Null);
        let err = verify.call(res).await.unwrap_err();
        assert_eq!(err.to_string(), "event carries no application id");
    }
}
