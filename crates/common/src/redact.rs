//! Redaction of sensitive values before they reach the logs.
//!
//! Every function here returns a redacted copy and leaves its input untouched,
//! so masked values can never leak back into downstream processing.

use serde_json::Value;

pub const MASKED: &str = "***MASKED***";
pub const MASKED_BASIC_TOKEN: &str = "Basic ***MASKED***";
pub const MASKED_METHOD_ARN: &str = "arn:aws:***MASKED***";

/// Body field carrying the event source's webhook identifier.
pub const WEBHOOK_ID_FIELD: &str = "WebhookId";

/// Redact an authorizer event: the token and the method ARN are replaced by
/// fixed mask strings when present.
pub fn sanitize_authorizer_event(event: &Value) -> Value {
    let mut sanitized = event.clone();
    if let Some(obj) = sanitized.as_object_mut() {
        if obj.contains_key("authorizationToken") {
            obj.insert(
                "authorizationToken".to_string(),
                Value::String(MASKED_BASIC_TOKEN.to_string()),
            );
        }
        if obj.contains_key("methodArn") {
            obj.insert(
                "methodArn".to_string(),
                Value::String(MASKED_METHOD_ARN.to_string()),
            );
        }
    }
    sanitized
}

/// Redact a proxy-shaped HTTP request: `Authorization` in `headers` and
/// `multiValueHeaders`, and the webhook id inside a JSON `body`.
///
/// Header names are matched case-insensitively. A body that is not JSON is
/// copied unchanged.
pub fn sanitize_proxy_request(request: &Value) -> Value {
    let mut sanitized = request.clone();
    let Some(obj) = sanitized.as_object_mut() else {
        return sanitized;
    };

    if let Some(Value::Object(headers)) = obj.get_mut("headers") {
        for (name, value) in headers.iter_mut() {
            if name.eq_ignore_ascii_case("authorization") {
                *value = Value::String(MASKED_BASIC_TOKEN.to_string());
            }
        }
    }

    if let Some(Value::Object(headers)) = obj.get_mut("multiValueHeaders") {
        for (name, value) in headers.iter_mut() {
            if name.eq_ignore_ascii_case("authorization") {
                *value = Value::Array(vec![Value::String(MASKED_BASIC_TOKEN.to_string())]);
            }
        }
    }

    match obj.get_mut("body") {
        Some(Value::String(body)) => {
            if let Some(masked) = mask_webhook_id_in_body(body) {
                *body = masked;
            }
        }
        Some(Value::Object(body)) => mask_webhook_id(body),
        _ => {}
    }

    sanitized
}

/// Re-serialize a JSON body with the webhook id masked. `None` when the body
/// is not a JSON object or carries no webhook id.
fn mask_webhook_id_in_body(body: &str) -> Option<String> {
    let mut data: Value = serde_json::from_str(body).ok()?;
    let obj = data.as_object_mut()?;
    if !obj.contains_key(WEBHOOK_ID_FIELD) {
        return None;
    }
    mask_webhook_id(obj);
    Some(data.to_string())
}

fn mask_webhook_id(body: &mut serde_json::Map<String, Value>) {
    if let Some(id) = body.get_mut(WEBHOOK_ID_FIELD) {
        *id = Value::String(MASKED.to_string());
    }
}
