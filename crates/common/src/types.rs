use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

/// Generic message returned for any internal failure.
pub const INTERNAL_SERVER_ERROR: &str = "Internal Server Error";

/// Platform-shaped HTTP response: a status code plus a JSON string body of
/// the form `{"message": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status_code: u16, message: &str) -> Self {
        // `": "` separator, as the platform's consumers expect
        let body = format!(
            "{{\"message\": {}}}",
            serde_json::Value::String(message.to_string())
        );
        Self { status_code, body }
    }

    pub fn ok(message: &str) -> Self {
        Self::new(200, message)
    }

    pub fn bad_request(message: &str) -> Self {
        Self::new(400, message)
    }

    pub fn internal_error() -> Self {
        Self::new(500, INTERNAL_SERVER_ERROR)
    }

    /// The `message` carried in the body, if the body is well formed.
    pub fn message(&self) -> Option<String> {
        let value: serde_json::Value = serde_json::from_str(&self.body).ok()?;
        value.get("message")?.as_str().map(str::to_string)
    }

    /// Render as a plain HTTP response: the status code becomes the HTTP
    /// status and the body is sent as JSON.
    pub fn into_http_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (
            status,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            self.body,
        )
            .into_response()
    }
}

/// Invocation endpoints answer with the platform shape itself.
impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Batch of queue messages delivered to the notifier.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueueEvent {
    #[serde(rename = "Records")]
    pub records: Vec<QueueRecord>,
}

/// One queue message. Only `body` is interpreted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueRecord {
    #[serde(rename = "messageId", default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    pub body: String,
}

impl QueueEvent {
    pub fn from_bodies(bodies: impl IntoIterator<Item = String>) -> Self {
        Self {
            records: bodies
                .into_iter()
                .map(|body| QueueRecord {
                    message_id: None,
                    body,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_response_body_format() {
        let response = ApiResponse::ok("Deal ignored. Not a 'Won' deal.");
        assert_eq!(response.status_code, 200);
        assert_eq!(
            response.body,
            "{\"message\": \"Deal ignored. Not a 'Won' deal.\"}"
        );
        assert_eq!(
            response.message().as_deref(),
            Some("Deal ignored. Not a 'Won' deal.")
        );
    }

    #[test]
    fn test_api_response_serializes_with_status_code_key() {
        let json = serde_json::to_value(ApiResponse::internal_error()).unwrap();
        assert_eq!(json["statusCode"], 500);
        assert_eq!(json["body"], "{\"message\": \"Internal Server Error\"}");
    }

    #[test]
    fn test_message_with_quotes_is_escaped() {
        let response = ApiResponse::bad_request("say \"hi\"");
        assert_eq!(response.message().as_deref(), Some("say \"hi\""));
    }

    #[test]
    fn test_queue_event_deserializes_records() {
        let event: QueueEvent = serde_json::from_str(
            r#"{"Records":[{"messageId":"m-1","body":"{}","eventSource":"aws:sqs"}]}"#,
        )
        .unwrap();
        assert_eq!(event.records.len(), 1);
        assert_eq!(event.records[0].message_id.as_deref(), Some("m-1"));
        assert_eq!(event.records[0].body, "{}");
    }
}
