//! Receiver invocation endpoint.
//!
//! Accepts an API-gateway proxy event and answers with `{statusCode, body}`.

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::routing::post;
use serde_json::Value;

use dealflow_common::queue::QueuePublisher;
use dealflow_common::types::ApiResponse;

use crate::handler;
use crate::state::AppState;

pub fn router<Q>() -> Router<AppState<Q>>
where
    Q: QueuePublisher + Clone + Send + Sync + 'static,
{
    Router::new().route("/invoke", post(invoke::<Q>))
}

/// POST /invoke — Run the filter-and-forward handler on a proxy event.
async fn invoke<Q>(State(state): State<AppState<Q>>, body: Bytes) -> ApiResponse
where
    Q: QueuePublisher + Clone + Send + Sync + 'static,
{
    let event: Value = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(e) => {
            tracing::error!(error = %e, "Invocation event is not valid JSON");
            return ApiResponse::internal_error();
        }
    };

    handler::handle(&event, &state.queue, &state.queue_url).await
}
