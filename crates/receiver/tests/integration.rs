//! Integration tests for the receiver routes.
//!
//! Uses `tower::ServiceExt` to drive the Axum router without a real HTTP
//! server, with an in-memory queue standing in for SQS/Redis.

use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

use dealflow_authorizer::credentials::ReferenceCredentials;
use dealflow_common::error::AppError;
use dealflow_common::queue::QueuePublisher;
use dealflow_receiver::routes::create_router;
use dealflow_receiver::state::AppState;

const QUEUE_URL: &str = "won-deals";

/// `Basic base64(admin:secret)`
const VALID_AUTH: &str = "Basic YWRtaW46c2VjcmV0";

// ============================================================
// Helpers
// ============================================================

#[derive(Clone, Default)]
struct MemoryQueue {
    messages: Arc<Mutex<Vec<String>>>,
}

impl MemoryQueue {
    fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl QueuePublisher for MemoryQueue {
    async fn send(&self, queue_url: &str, body: &str) -> Result<String, AppError> {
        assert_eq!(queue_url, QUEUE_URL);
        self.messages.lock().unwrap().push(body.to_string());
        Ok("msg-1".to_string())
    }
}

fn app_state(queue: MemoryQueue) -> AppState<MemoryQueue> {
    AppState::new(queue, QUEUE_URL, ReferenceCredentials::new("admin", "secret"))
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn deal(state: &str) -> Value {
    json!({
        "WebhookId": "wh-secret-42",
        "Payload": {
            "Title": "Data platform",
            "CurrentState": {"StateTitle": state}
        }
    })
}

// ============================================================
// /invoke
// ============================================================

#[tokio::test]
async fn test_invoke_won_deal_forwarded() {
    let queue = MemoryQueue::default();
    let app = create_router(app_state(queue.clone()));

    let event = json!({
        "headers": {"Authorization": "Basic YWRtaW46c2VjcmV0"},
        "body": deal("Won").to_string()
    });
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/invoke")
                .header("content-type", "application/json")
                .body(Body::from(event.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["statusCode"], 200);
    assert_eq!(json["body"], "{\"message\": \"Won deal forwarded to SQS.\"}");

    let messages = queue.messages();
    assert_eq!(messages.len(), 1);
    let forwarded: Value = serde_json::from_str(&messages[0]).unwrap();
    assert!(forwarded.get("WebhookId").is_none());
    assert_eq!(forwarded["Payload"]["Title"], "Data platform");
}

#[tokio::test]
async fn test_invoke_lost_deal_ignored() {
    let queue = MemoryQueue::default();
    let app = create_router(app_state(queue.clone()));

    let event = json!({
        "body": r#"{"WebhookId":"abc","Payload":{"CurrentState":{"StateTitle":"Lost"}}}"#
    });
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/invoke")
                .body(Body::from(event.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let json = body_json(response).await;
    assert_eq!(
        json,
        json!({"statusCode": 200, "body": "{\"message\": \"Deal ignored. Not a 'Won' deal.\"}"})
    );
    assert!(queue.messages().is_empty());
}

#[tokio::test]
async fn test_invoke_garbage_event_is_internal_error() {
    let queue = MemoryQueue::default();
    let app = create_router(app_state(queue.clone()));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/invoke")
                .body(Body::from("<<<"))
                .unwrap(),
        )
        .await
        .unwrap();

    let json = body_json(response).await;
    assert_eq!(json["statusCode"], 500);
    assert_eq!(json["body"], "{\"message\": \"Internal Server Error\"}");
    assert!(queue.messages().is_empty());
}

// ============================================================
// /webhook
// ============================================================

#[tokio::test]
async fn test_webhook_won_deal_forwarded() {
    let queue = MemoryQueue::default();
    let app = create_router(app_state(queue.clone()));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/webhook")
                .header("authorization", VALID_AUTH)
                .header("content-type", "application/json")
                .body(Body::from(deal("Won").to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Won deal forwarded to SQS.");

    let messages = queue.messages();
    assert_eq!(messages.len(), 1);
    assert!(!messages[0].contains("wh-secret-42"));
}

#[tokio::test]
async fn test_webhook_empty_body_is_bad_request() {
    let queue = MemoryQueue::default();
    let app = create_router(app_state(queue.clone()));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/webhook")
                .header("authorization", VALID_AUTH)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["message"], "No request body provided.");
    assert!(queue.messages().is_empty());
}

async fn post_won_deal(app: axum::Router, authorization: Option<&str>) -> axum::response::Response {
    let mut request = Request::builder()
        .method("POST")
        .uri("/webhook")
        .header("content-type", "application/json");
    if let Some(authorization) = authorization {
        request = request.header("authorization", authorization);
    }
    app.oneshot(request.body(Body::from(deal("Won").to_string())).unwrap())
        .await
        .unwrap()
}

#[tokio::test]
async fn test_webhook_without_credentials_is_unauthorized() {
    let queue = MemoryQueue::default();
    let app = create_router(app_state(queue.clone()));

    let response = post_won_deal(app, None).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().contains_key("www-authenticate"));
    let json = body_json(response).await;
    assert_eq!(json["message"], "Unauthorized");
    assert!(queue.messages().is_empty());
}

#[tokio::test]
async fn test_webhook_malformed_credentials_are_unauthorized() {
    let queue = MemoryQueue::default();

    for header in ["Bearer abc.def", "Basic !!!", "Basic YWRtaW5zZWNyZXQ="] {
        let app = create_router(app_state(queue.clone()));
        let response = post_won_deal(app, Some(header)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{header}");
    }
    assert!(queue.messages().is_empty());
}

#[tokio::test]
async fn test_webhook_wrong_password_is_forbidden() {
    let queue = MemoryQueue::default();
    let app = create_router(app_state(queue.clone()));

    // admin:wrong
    let response = post_won_deal(app, Some("Basic YWRtaW46d3Jvbmc=")).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Forbidden");
    assert!(queue.messages().is_empty());
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_router(app_state(MemoryQueue::default()));
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["service"], "dealflow-receiver");
}
