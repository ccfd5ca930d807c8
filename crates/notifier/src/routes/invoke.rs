//! Notifier invocation endpoint.
//!
//! Accepts a queue event `{"Records": [{"body": ...}, ...]}` and answers with
//! `{statusCode, body}`.

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::routing::post;

use dealflow_common::types::{ApiResponse, QueueEvent};

use crate::handler;
use crate::slack::ChatPoster;
use crate::state::AppState;

pub fn router<P>() -> Router<AppState<P>>
where
    P: ChatPoster + Clone + Send + Sync + 'static,
{
    Router::new().route("/invoke", post(invoke::<P>))
}

/// POST /invoke — Notify for every message in the batch.
async fn invoke<P>(State(state): State<AppState<P>>, body: Bytes) -> ApiResponse
where
    P: ChatPoster + Clone + Send + Sync + 'static,
{
    let event: QueueEvent = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(e) => {
            tracing::error!(error = %e, "Queue event is malformed");
            return ApiResponse::internal_error();
        }
    };

    handler::handle(&event, &state.poster).await
}
