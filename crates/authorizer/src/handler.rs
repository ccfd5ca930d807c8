//! Token authorizer entry point.
//!
//! Every failure path ends in a Deny policy; nothing is ever surfaced to the
//! caller as an error.

use serde::Deserialize;
use serde_json::Value;

use dealflow_common::redact::sanitize_authorizer_event;

use crate::credentials::{BasicCredentials, ReferenceCredentials, TokenError};
use crate::policy::{Decision, PolicyResponse};

/// Fields of the authorizer event that drive the decision.
#[derive(Debug, Default, Deserialize)]
pub struct AuthorizerEvent {
    #[serde(rename = "methodArn", default)]
    pub method_arn: Option<String>,
    #[serde(rename = "authorizationToken", default)]
    pub authorization_token: Option<String>,
}

impl AuthorizerEvent {
    /// Lenient extraction: fields of the wrong type count as absent.
    pub fn from_value(event: &Value) -> Self {
        let field = |name: &str| event.get(name).and_then(Value::as_str).map(str::to_string);
        Self {
            method_arn: field("methodArn"),
            authorization_token: field("authorizationToken"),
        }
    }
}

/// Handle one authorizer invocation.
pub fn handle(event: &Value, reference: &ReferenceCredentials) -> PolicyResponse {
    tracing::info!(
        event = %sanitize_authorizer_event(event),
        "Received authorizer event (sanitized)"
    );

    decide(&AuthorizerEvent::from_value(event), reference).into_policy()
}

/// Decide whether the event's credentials grant access to its resource.
pub fn decide(event: &AuthorizerEvent, reference: &ReferenceCredentials) -> Decision {
    let Some(method_arn) = event.method_arn.as_deref().filter(|arn| !arn.is_empty()) else {
        tracing::error!("methodArn is missing, denying request");
        return Decision::deny_all();
    };

    tracing::info!("Received methodArn");

    let credentials = match BasicCredentials::parse(event.authorization_token.as_deref()) {
        Ok(credentials) => credentials,
        Err(TokenError::MissingOrInvalidScheme) => {
            tracing::warn!("Invalid or missing Authorization token, denying request");
            return Decision::deny(method_arn);
        }
        Err(TokenError::Malformed) => {
            tracing::warn!("Malformed credentials, denying request");
            return Decision::deny(method_arn);
        }
        Err(TokenError::Decode) => {
            tracing::error!("Error decoding credentials, denying request");
            return Decision::deny(method_arn);
        }
    };

    tracing::info!(username = %credentials.username, "Decoded credentials");

    if reference.matches(&credentials) {
        tracing::info!(username = %credentials.username, "Authentication successful");
        Decision::allow(method_arn)
    } else {
        tracing::warn!(username = %credentials.username, "Authentication failed");
        Decision::deny(method_arn)
    }
}
