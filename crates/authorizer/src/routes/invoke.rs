//! Authorizer invocation endpoint.
//!
//! Accepts the token-authorizer event and answers with the policy document.
//! A body that is not JSON is answered with a Deny like any other bad input.

use axum::body::Bytes;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::Value;

use crate::handler;
use crate::policy::PolicyResponse;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/invoke", post(invoke))
}

/// POST /invoke — Evaluate `{methodArn, authorizationToken}`.
async fn invoke(State(state): State<AppState>, body: Bytes) -> Json<PolicyResponse> {
    let event: Value = serde_json::from_slice(&body).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Authorizer event is not valid JSON");
        Value::Null
    });

    Json(handler::handle(&event, &state.credentials))
}
