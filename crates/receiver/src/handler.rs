//! Webhook filter-and-forward logic.
//!
//! Only deals whose current state is `Won` reach the queue, and never with
//! their webhook id.

use serde_json::Value;

use dealflow_common::error::AppError;
use dealflow_common::queue::QueuePublisher;
use dealflow_common::redact::{WEBHOOK_ID_FIELD, sanitize_proxy_request};
use dealflow_common::types::ApiResponse;

pub const WON_STATE: &str = "Won";

pub const MSG_NO_BODY: &str = "No request body provided.";
pub const MSG_IGNORED: &str = "Deal ignored. Not a 'Won' deal.";
pub const MSG_FORWARDED: &str = "Won deal forwarded to SQS.";

/// Handle one proxy-shaped webhook request.
///
/// Never fails: parse and publish errors are logged and answered with 500.
pub async fn handle<Q: QueuePublisher + Sync>(
    request: &Value,
    queue: &Q,
    queue_url: &str,
) -> ApiResponse {
    tracing::info!(
        event = %sanitize_proxy_request(request),
        "Received webhook request (sanitized)"
    );

    match process(request, queue, queue_url).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(error = %e, "Error processing webhook");
            ApiResponse::internal_error()
        }
    }
}

async fn process<Q: QueuePublisher + Sync>(
    request: &Value,
    queue: &Q,
    queue_url: &str,
) -> Result<ApiResponse, AppError> {
    let body = match request.get("body") {
        None | Some(Value::Null) => None,
        Some(Value::String(body)) => Some(body.as_str()),
        Some(_) => {
            return Err(AppError::Validation("request body is not a string".to_string()));
        }
    };

    let Some(body) = body.filter(|b| !b.is_empty()) else {
        tracing::warn!("No body found in the request");
        return Ok(ApiResponse::bad_request(MSG_NO_BODY));
    };

    let mut data: Value = serde_json::from_str(body)?;
    let deal = data
        .as_object_mut()
        .ok_or_else(|| AppError::Validation("webhook body is not a JSON object".to_string()))?;
    deal.remove(WEBHOOK_ID_FIELD);

    if !is_won(&data) {
        tracing::info!("Ignoring deal, not in Won state");
        return Ok(ApiResponse::ok(MSG_IGNORED));
    }

    let message_id = queue.send(queue_url, &data.to_string()).await?;
    tracing::info!(%message_id, "Won deal forwarded to queue (webhook id removed)");

    Ok(ApiResponse::ok(MSG_FORWARDED))
}

/// True when `Payload.CurrentState.StateTitle` is exactly `Won`.
pub fn is_won(deal: &Value) -> bool {
    deal.pointer("/Payload/CurrentState/StateTitle")
        .and_then(Value::as_str)
        == Some(WON_STATE)
}
